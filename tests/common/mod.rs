//! Shared test support: in-memory stores and an application builder.
//!
//! Integration tests drive the real router; only the storage seams are
//! substituted. The mocks implement the same version-stamp and expiry rules
//! as the Postgres stores so the pipeline semantics carry over unchanged.

// Not every test binary uses every helper.
#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, header};
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use tower::ServiceExt;
use uuid::Uuid;

use reelvault::metrics::Metrics;
use reelvault::middleware::rate_limit::LimiterRegistry;
use reelvault::modules::movies::model::{CreateMovieDto, Movie, Runtime};
use reelvault::modules::movies::service::MovieStore;
use reelvault::modules::tokens::service::TokenStore;
use reelvault::modules::users::model::User;
use reelvault::modules::users::service::{PermissionStore, UserStore};
use reelvault::router::init_router;
use reelvault::state::AppState;
use reelvault::utils::errors::StoreError;
use reelvault_auth::{SCOPE_AUTHENTICATION, Token, generate_token};
use reelvault_config::{CorsConfig, RateLimitConfig, TokenConfig};
use reelvault_core::{Filters, Metadata, Permissions};

/// In-memory users, tokens, and permissions, sharing one struct the way the
/// Postgres tables share one database.
#[derive(Default)]
pub struct MockDb {
    pub users: Mutex<Vec<User>>,
    pub tokens: Mutex<Vec<Token>>,
    pub permissions: Mutex<HashMap<Uuid, Vec<String>>>,
    /// Counts `get_for_token` calls, so tests can assert that malformed
    /// tokens never reach the store.
    pub token_lookups: AtomicUsize,
    /// When set, permission lookups fail as if the store were unreachable.
    pub permission_failure: AtomicBool,
}

#[async_trait]
impl UserStore for MockDb {
    async fn insert(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, StoreError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == email) {
            return Err(StoreError::DuplicateEmail);
        }

        let user = User {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            name: name.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            activated: false,
            version: 1,
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn get_by_email(&self, email: &str) -> Result<User, StoreError> {
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn get_for_token(&self, scope: &str, token_hash: &[u8]) -> Result<User, StoreError> {
        self.token_lookups.fetch_add(1, Ordering::SeqCst);

        let user_id = self
            .tokens
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.scope == scope && t.hash == token_hash && t.expiry > Utc::now())
            .map(|t| t.user_id)
            .ok_or(StoreError::NotFound)?;

        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == user_id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn update(&self, user: &User) -> Result<i32, StoreError> {
        let mut users = self.users.lock().unwrap();
        let stored = users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or(StoreError::NotFound)?;

        if stored.version != user.version {
            return Err(StoreError::EditConflict);
        }

        *stored = user.clone();
        stored.version += 1;
        Ok(stored.version)
    }
}

#[async_trait]
impl TokenStore for MockDb {
    async fn insert(&self, token: &Token) -> Result<(), StoreError> {
        self.tokens.lock().unwrap().push(token.clone());
        Ok(())
    }

    async fn delete_all_for_user(&self, scope: &str, user_id: Uuid) -> Result<(), StoreError> {
        self.tokens
            .lock()
            .unwrap()
            .retain(|t| !(t.scope == scope && t.user_id == user_id));
        Ok(())
    }
}

#[async_trait]
impl PermissionStore for MockDb {
    async fn permissions_for(&self, user_id: Uuid) -> Result<Permissions, StoreError> {
        if self.permission_failure.load(Ordering::SeqCst) {
            return Err(StoreError::Other(anyhow::anyhow!(
                "permission store unavailable"
            )));
        }

        let codes = self
            .permissions
            .lock()
            .unwrap()
            .get(&user_id)
            .cloned()
            .unwrap_or_default();
        Ok(Permissions::new(codes))
    }

    async fn grant(&self, user_id: Uuid, codes: &[&str]) -> Result<(), StoreError> {
        self.permissions
            .lock()
            .unwrap()
            .entry(user_id)
            .or_default()
            .extend(codes.iter().map(|c| c.to_string()));
        Ok(())
    }
}

/// In-memory movie store with the same version semantics as Postgres.
#[derive(Default)]
pub struct MockMovieStore {
    pub movies: Mutex<HashMap<Uuid, Movie>>,
    /// Updates to these ids fail with an edit conflict, simulating a racing
    /// writer that got there first.
    pub conflicts: Mutex<HashSet<Uuid>>,
    /// When set, the next `get` panics, for exercising the panic guard
    /// through the full stack.
    pub panic_on_get: AtomicBool,
}

impl MockMovieStore {
    pub fn stored(&self, id: Uuid) -> Option<Movie> {
        self.movies.lock().unwrap().get(&id).cloned()
    }

    pub fn mark_conflict(&self, id: Uuid) {
        self.conflicts.lock().unwrap().insert(id);
    }
}

#[async_trait]
impl MovieStore for MockMovieStore {
    async fn insert(&self, dto: CreateMovieDto) -> Result<Movie, StoreError> {
        let movie = Movie {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            title: dto.title,
            year: dto.year,
            runtime: dto.runtime,
            genres: dto.genres,
            version: 1,
        };
        self.movies.lock().unwrap().insert(movie.id, movie.clone());
        Ok(movie)
    }

    async fn get(&self, id: Uuid) -> Result<Movie, StoreError> {
        if self.panic_on_get.load(Ordering::SeqCst) {
            panic!("MAMMA MIA!");
        }
        self.movies
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn update(&self, movie: &Movie) -> Result<i32, StoreError> {
        if self.conflicts.lock().unwrap().contains(&movie.id) {
            return Err(StoreError::EditConflict);
        }

        let mut movies = self.movies.lock().unwrap();
        let stored = movies.get_mut(&movie.id).ok_or(StoreError::NotFound)?;
        if stored.version != movie.version {
            return Err(StoreError::EditConflict);
        }

        *stored = movie.clone();
        stored.version += 1;
        Ok(stored.version)
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        self.movies
            .lock()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }

    async fn list(&self, filters: &Filters) -> Result<(Vec<Movie>, Metadata), StoreError> {
        let mut movies: Vec<Movie> = self
            .movies
            .lock()
            .unwrap()
            .values()
            .filter(|m| {
                filters.title.is_empty()
                    || m.title.to_lowercase().contains(&filters.title.to_lowercase())
            })
            .cloned()
            .collect();
        movies.sort_by_key(|m| m.id);

        let metadata = Metadata::calculate(movies.len() as i64, filters.page, filters.page_size);
        Ok((movies, metadata))
    }
}

pub struct TestApp {
    pub db: Arc<MockDb>,
    pub movies: Arc<MockMovieStore>,
    pub state: AppState,
}

impl TestApp {
    pub fn router(&self) -> Router {
        init_router(self.state.clone())
    }

    /// Creates an account directly in the store, bypassing the HTTP surface.
    pub fn seed_user(&self, email: &str, password: &str, activated: bool, codes: &[&str]) -> User {
        let user = User {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            name: "Test User".to_string(),
            email: email.to_string(),
            // Minimum cost keeps the suite fast; strength is irrelevant here.
            password_hash: bcrypt::hash(password, 4).unwrap(),
            activated,
            version: 1,
        };
        self.db.users.lock().unwrap().push(user.clone());
        self.db
            .permissions
            .lock()
            .unwrap()
            .insert(user.id, codes.iter().map(|c| c.to_string()).collect());
        user
    }

    /// Issues an authentication token for `user_id` and returns the
    /// plaintext a client would present.
    pub fn issue_token(&self, user_id: Uuid) -> String {
        let token = generate_token(user_id, Duration::hours(24), SCOPE_AUTHENTICATION);
        let plaintext = token.plaintext.clone();
        self.db.tokens.lock().unwrap().push(token);
        plaintext
    }

    /// Issues a token that is already past its expiry.
    pub fn issue_expired_token(&self, user_id: Uuid) -> String {
        let token = generate_token(user_id, Duration::hours(-1), SCOPE_AUTHENTICATION);
        let plaintext = token.plaintext.clone();
        self.db.tokens.lock().unwrap().push(token);
        plaintext
    }

    pub fn seed_movie(&self, title: &str, year: i32, runtime: i32, genres: &[&str]) -> Movie {
        let movie = Movie {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            title: title.to_string(),
            year,
            runtime: Runtime(runtime),
            genres: genres.iter().map(|g| g.to_string()).collect(),
            version: 1,
        };
        self.movies
            .movies
            .lock()
            .unwrap()
            .insert(movie.id, movie.clone());
        movie
    }
}

/// Application with rate limiting disabled and no trusted origins — the
/// baseline most tests want.
pub fn test_app() -> TestApp {
    test_app_with(RateLimitConfig::disabled(), CorsConfig::default())
}

pub fn test_app_with(rate_limit: RateLimitConfig, cors: CorsConfig) -> TestApp {
    let db = Arc::new(MockDb::default());
    let movies = Arc::new(MockMovieStore::default());

    let state = AppState {
        environment: "test".to_string(),
        movies: movies.clone(),
        users: db.clone(),
        tokens: db.clone(),
        permissions: db.clone(),
        cors_config: cors,
        rate_limit_config: rate_limit.clone(),
        token_config: TokenConfig::default(),
        limiter: Arc::new(LimiterRegistry::new(rate_limit)),
        metrics: Arc::new(Metrics::new()),
    };

    TestApp { db, movies, state }
}

// Request helpers ------------------------------------------------------------

pub fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

pub fn get_with_token(uri: &str, token: &str) -> Request<Body> {
    Request::get(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

pub fn post_json(uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn post_json_with_token(uri: &str, body: &serde_json::Value, token: &str) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn patch_json_with_token(uri: &str, body: &str, token: &str) -> Request<Body> {
    Request::patch(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn put_json(uri: &str, body: &str) -> Request<Body> {
    Request::put(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn delete_with_token(uri: &str, token: &str) -> Request<Body> {
    Request::delete(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

pub async fn send(router: Router, request: Request<Body>) -> Response<Body> {
    router.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}
