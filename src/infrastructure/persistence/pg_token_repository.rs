//! PostgreSQL implementation of token repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;

use super::with_timeout;
use crate::domain::entities::{NewToken, TokenScope};
use crate::domain::repositories::TokenRepository;
use crate::error::AppError;

/// PostgreSQL repository for bearer tokens.
///
/// Stores keyed hashes (HMAC-SHA256) only. Raw tokens are never persisted.
pub struct PgTokenRepository {
    pool: Arc<PgPool>,
    timeout: Duration,
}

impl PgTokenRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>, timeout: Duration) -> Self {
        Self { pool, timeout }
    }
}

#[async_trait]
impl TokenRepository for PgTokenRepository {
    async fn insert(&self, token: NewToken) -> Result<(), AppError> {
        with_timeout(
            self.timeout,
            sqlx::query(
                r#"
                INSERT INTO tokens (hash, user_id, expiry, scope)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(&token.hash)
            .bind(token.user_id)
            .bind(token.expiry)
            .bind(token.scope.as_str())
            .execute(self.pool.as_ref()),
        )
        .await?;

        Ok(())
    }

    async fn delete_all_for_user(&self, scope: TokenScope, user_id: i64) -> Result<u64, AppError> {
        let result = with_timeout(
            self.timeout,
            sqlx::query("DELETE FROM tokens WHERE scope = $1 AND user_id = $2")
                .bind(scope.as_str())
                .bind(user_id)
                .execute(self.pool.as_ref()),
        )
        .await?;

        Ok(result.rows_affected())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, AppError> {
        let result = with_timeout(
            self.timeout,
            sqlx::query("DELETE FROM tokens WHERE expiry <= $1")
                .bind(now)
                .execute(self.pool.as_ref()),
        )
        .await?;

        Ok(result.rows_affected())
    }
}
