//! Repository trait for bearer token storage.

use crate::domain::entities::{NewToken, TokenScope};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Repository interface for tokens.
///
/// Tokens are stored as keyed hashes; the plaintext never reaches the store.
/// Lookups go through [`crate::domain::repositories::UserRepository::find_for_token`].
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgTokenRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Persists a token.
    async fn insert(&self, token: NewToken) -> Result<(), AppError>;

    /// Deletes every token of `scope` held by `user_id`.
    async fn delete_all_for_user(&self, scope: TokenScope, user_id: i64) -> Result<u64, AppError>;

    /// Deletes every token whose expiry is at or before `now`.
    ///
    /// Returns the number of deleted tokens.
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, AppError>;
}
