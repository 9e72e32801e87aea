//! Token storage. Only digests are persisted; the plaintext exists for the
//! lifetime of the issuing request and no longer.

use async_trait::async_trait;
use reelvault_auth::Token;
use sqlx::PgPool;
use uuid::Uuid;

use crate::utils::errors::StoreError;

/// Storage contract for issued tokens.
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn insert(&self, token: &Token) -> Result<(), StoreError>;

    async fn delete_all_for_user(&self, scope: &str, user_id: Uuid) -> Result<(), StoreError>;
}

pub struct PgTokenStore {
    pool: PgPool,
}

impl PgTokenStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TokenStore for PgTokenStore {
    async fn insert(&self, token: &Token) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO tokens (hash, user_id, expiry, scope)
             VALUES ($1, $2, $3, $4)",
        )
        .bind(&token.hash)
        .bind(token.user_id)
        .bind(token.expiry)
        .bind(&token.scope)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_all_for_user(&self, scope: &str, user_id: Uuid) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM tokens WHERE scope = $1 AND user_id = $2")
            .bind(scope)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
