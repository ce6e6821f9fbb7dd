//! Permission lookups for authorization gates.

use std::sync::Arc;

use crate::domain::entities::Permissions;
use crate::domain::repositories::PermissionRepository;
use crate::error::AppError;

/// Service answering "does this user hold this permission?".
pub struct PermissionService<P: PermissionRepository + ?Sized> {
    repository: Arc<P>,
}

impl<P: PermissionRepository + ?Sized> PermissionService<P> {
    pub fn new(repository: Arc<P>) -> Self {
        Self { repository }
    }

    pub async fn get_all_for_user(&self, user_id: i64) -> Result<Permissions, AppError> {
        self.repository.get_all_for_user(user_id).await
    }

    pub async fn grant(&self, user_id: i64, codes: &[String]) -> Result<(), AppError> {
        self.repository.add_for_user(user_id, codes).await
    }

    /// Checks that `user_id` holds `code`.
    ///
    /// Fails closed: if the lookup itself fails, the request is denied with
    /// [`AppError::NotPermitted`] and the failure is logged.
    pub async fn require(&self, user_id: i64, code: &str) -> Result<(), AppError> {
        let permissions = match self.repository.get_all_for_user(user_id).await {
            Ok(permissions) => permissions,
            Err(e) => {
                tracing::warn!(user_id, permission = code, error = %e, "Permission lookup failed, denying");
                return Err(AppError::NotPermitted);
            }
        };

        if permissions.include(code) {
            Ok(())
        } else {
            Err(AppError::NotPermitted)
        }
    }
}
