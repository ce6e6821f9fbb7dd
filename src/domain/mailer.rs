//! Outbound mail port.

use async_trait::async_trait;

use crate::domain::entities::{IssuedToken, User};
use crate::error::AppError;

/// Delivers account emails.
///
/// # Implementations
///
/// - [`crate::infrastructure::mailer::LogMailer`] - writes the message to the log
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Sends the welcome email carrying the account activation token.
    async fn send_activation(&self, recipient: &User, token: &IssuedToken) -> Result<(), AppError>;
}
