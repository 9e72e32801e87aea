//! User and permission storage.
//!
//! The traits are the seam the pipeline depends on; the `Pg*` types are the
//! production implementations. Tests substitute in-memory stores.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reelvault_core::Permissions;
use sqlx::PgPool;
use uuid::Uuid;

use crate::modules::users::model::User;
use crate::utils::errors::StoreError;

/// Storage contract for accounts.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert(&self, name: &str, email: &str, password_hash: &str)
    -> Result<User, StoreError>;

    async fn get_by_email(&self, email: &str) -> Result<User, StoreError>;

    /// Resolves a token digest within `scope` to its owner. Expired tokens
    /// resolve exactly like absent ones: [`StoreError::NotFound`].
    async fn get_for_token(&self, scope: &str, token_hash: &[u8]) -> Result<User, StoreError>;

    /// Writes `user`'s fields back, expecting `user.version` to still be
    /// current, and returns the incremented version. A stale version is
    /// [`StoreError::EditConflict`].
    async fn update(&self, user: &User) -> Result<i32, StoreError>;
}

/// Per-user permission codes. Looked up per call, never cached on the
/// principal.
#[async_trait]
pub trait PermissionStore: Send + Sync {
    async fn permissions_for(&self, user_id: Uuid) -> Result<Permissions, StoreError>;

    async fn grant(&self, user_id: Uuid, codes: &[&str]) -> Result<(), StoreError>;
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    created_at: DateTime<Utc>,
    name: String,
    email: String,
    password_hash: String,
    activated: bool,
    version: i32,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            created_at: row.created_at,
            name: row.name,
            email: row.email,
            password_hash: row.password_hash,
            activated: row.activated,
            version: row.version,
        }
    }
}

const USER_COLUMNS: &str = "id, created_at, name, email, password_hash, activated, version";

pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn insert(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "INSERT INTO users (name, email, password_hash)
             VALUES ($1, $2, $3)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn get_by_email(&self, email: &str) -> Result<User, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)?;

        Ok(row.into())
    }

    async fn get_for_token(&self, scope: &str, token_hash: &[u8]) -> Result<User, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT u.id, u.created_at, u.name, u.email, u.password_hash, u.activated, u.version
             FROM users u
             INNER JOIN tokens t ON t.user_id = u.id
             WHERE t.hash = $1 AND t.scope = $2 AND t.expiry > now()",
        )
        .bind(token_hash)
        .bind(scope)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)?;

        Ok(row.into())
    }

    async fn update(&self, user: &User) -> Result<i32, StoreError> {
        let version: Option<(i32,)> = sqlx::query_as(
            "UPDATE users
             SET name = $1, email = $2, password_hash = $3, activated = $4, version = version + 1
             WHERE id = $5 AND version = $6
             RETURNING version",
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.activated)
        .bind(user.id)
        .bind(user.version)
        .fetch_optional(&self.pool)
        .await?;

        version.map(|(v,)| v).ok_or(StoreError::EditConflict)
    }
}

pub struct PgPermissionStore {
    pool: PgPool,
}

impl PgPermissionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PermissionStore for PgPermissionStore {
    async fn permissions_for(&self, user_id: Uuid) -> Result<Permissions, StoreError> {
        let codes: Vec<String> = sqlx::query_scalar(
            "SELECT p.code
             FROM permissions p
             INNER JOIN users_permissions up ON up.permission_id = p.id
             WHERE up.user_id = $1",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Permissions::new(codes))
    }

    async fn grant(&self, user_id: Uuid, codes: &[&str]) -> Result<(), StoreError> {
        let codes: Vec<String> = codes.iter().map(|c| c.to_string()).collect();
        sqlx::query(
            "INSERT INTO users_permissions (user_id, permission_id)
             SELECT $1, p.id FROM permissions p WHERE p.code = ANY($2)",
        )
        .bind(user_id)
        .bind(&codes)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
