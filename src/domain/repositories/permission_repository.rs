//! Repository trait for user permissions.

use crate::domain::entities::Permissions;
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for the user/permission relation.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgPermissionRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PermissionRepository: Send + Sync {
    /// Returns all permission codes granted to a user.
    async fn get_all_for_user(&self, user_id: i64) -> Result<Permissions, AppError>;

    /// Grants the given permission codes to a user. Unknown codes are ignored.
    async fn add_for_user(&self, user_id: i64, codes: &[String]) -> Result<(), AppError>;
}
