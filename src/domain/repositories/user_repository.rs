//! Repository trait for user accounts.

use crate::domain::entities::{NewUser, TokenScope, User, UserCredentials};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Repository interface for users.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgUserRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Creates a user.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the email is already registered.
    async fn insert(&self, new_user: NewUser) -> Result<User, AppError>;

    /// Finds a user and their password hash by email.
    async fn find_by_email(&self, email: &str) -> Result<Option<UserCredentials>, AppError>;

    /// Resolves a token hash to the owning user.
    ///
    /// Only tokens of the given scope whose expiry is after `now` match, so an
    /// expired token looks exactly like an unknown one.
    async fn find_for_token(
        &self,
        scope: TokenScope,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, AppError>;

    /// Marks a user as activated. Returns `Ok(false)` if the user does not exist.
    async fn activate(&self, user_id: i64) -> Result<bool, AppError>;

    /// Lists all users ordered by id.
    async fn list(&self) -> Result<Vec<User>, AppError>;
}
