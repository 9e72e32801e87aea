//! Movie storage.
//!
//! The optimistic-concurrency rules live at this seam: `update` compares the
//! caller's version stamp against the stored one and bumps it by exactly one
//! inside the same statement, so two racing writers cannot both win.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reelvault_core::{Filters, Metadata};
use sqlx::PgPool;
use uuid::Uuid;

use crate::modules::movies::model::{CreateMovieDto, Movie, Runtime};
use crate::utils::errors::StoreError;

/// Storage contract for movie records.
#[async_trait]
pub trait MovieStore: Send + Sync {
    async fn insert(&self, dto: CreateMovieDto) -> Result<Movie, StoreError>;

    async fn get(&self, id: Uuid) -> Result<Movie, StoreError>;

    /// Persists `movie`'s fields, expecting `movie.version` to still be
    /// current. Returns the incremented version; a stale stamp is
    /// [`StoreError::EditConflict`].
    async fn update(&self, movie: &Movie) -> Result<i32, StoreError>;

    async fn delete(&self, id: Uuid) -> Result<(), StoreError>;

    async fn list(&self, filters: &Filters) -> Result<(Vec<Movie>, Metadata), StoreError>;
}

#[derive(sqlx::FromRow)]
struct MovieRow {
    id: Uuid,
    created_at: DateTime<Utc>,
    title: String,
    year: i32,
    runtime: i32,
    genres: Vec<String>,
    version: i32,
}

impl From<MovieRow> for Movie {
    fn from(row: MovieRow) -> Self {
        Movie {
            id: row.id,
            created_at: row.created_at,
            title: row.title,
            year: row.year,
            runtime: Runtime(row.runtime),
            genres: row.genres,
            version: row.version,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CountedMovieRow {
    total: i64,
    #[sqlx(flatten)]
    movie: MovieRow,
}

pub struct PgMovieStore {
    pool: PgPool,
}

impl PgMovieStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MovieStore for PgMovieStore {
    async fn insert(&self, dto: CreateMovieDto) -> Result<Movie, StoreError> {
        let row = sqlx::query_as::<_, MovieRow>(
            "INSERT INTO movies (title, year, runtime, genres)
             VALUES ($1, $2, $3, $4)
             RETURNING id, created_at, title, year, runtime, genres, version",
        )
        .bind(&dto.title)
        .bind(dto.year)
        .bind(dto.runtime.0)
        .bind(&dto.genres)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn get(&self, id: Uuid) -> Result<Movie, StoreError> {
        let row = sqlx::query_as::<_, MovieRow>(
            "SELECT id, created_at, title, year, runtime, genres, version
             FROM movies
             WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)?;

        Ok(row.into())
    }

    async fn update(&self, movie: &Movie) -> Result<i32, StoreError> {
        let version: Option<(i32,)> = sqlx::query_as(
            "UPDATE movies
             SET title = $1, year = $2, runtime = $3, genres = $4, version = version + 1
             WHERE id = $5 AND version = $6
             RETURNING version",
        )
        .bind(&movie.title)
        .bind(movie.year)
        .bind(movie.runtime.0)
        .bind(&movie.genres)
        .bind(movie.id)
        .bind(movie.version)
        .fetch_optional(&self.pool)
        .await?;

        version.map(|(v,)| v).ok_or(StoreError::EditConflict)
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM movies WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn list(&self, filters: &Filters) -> Result<(Vec<Movie>, Metadata), StoreError> {
        // sort_column/sort_direction only ever return safelisted values, so
        // interpolating them cannot inject.
        let query = format!(
            "SELECT count(*) OVER() AS total,
                    id, created_at, title, year, runtime, genres, version
             FROM movies
             WHERE (to_tsvector('simple', title) @@ plainto_tsquery('simple', $1) OR $1 = '')
               AND (genres @> $2 OR $2 = '{{}}')
             ORDER BY {} {}, id ASC
             LIMIT $3 OFFSET $4",
            filters.sort_column(),
            filters.sort_direction(),
        );

        let rows = sqlx::query_as::<_, CountedMovieRow>(&query)
            .bind(&filters.title)
            .bind(&filters.genres)
            .bind(filters.limit())
            .bind(filters.offset())
            .fetch_all(&self.pool)
            .await?;

        let total = rows.first().map(|row| row.total).unwrap_or(0);
        let metadata = Metadata::calculate(total, filters.page, filters.page_size);
        let movies = rows.into_iter().map(|row| row.movie.into()).collect();

        Ok((movies, metadata))
    }
}
