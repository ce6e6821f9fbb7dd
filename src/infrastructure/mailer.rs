//! Mail delivery.

use async_trait::async_trait;

use crate::domain::entities::{IssuedToken, User};
use crate::domain::mailer::Mailer;
use crate::error::AppError;

/// Mailer that writes each message to the log instead of sending it.
///
/// The activation token is part of the log record, so this is only suitable
/// where the log itself is the delivery channel (local development, staging).
#[derive(Debug, Default, Clone)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_activation(&self, recipient: &User, token: &IssuedToken) -> Result<(), AppError> {
        tracing::info!(
            user_id = recipient.id,
            to = %recipient.email,
            activation_token = %token.plaintext,
            expiry = %token.expiry,
            "Activation email"
        );
        Ok(())
    }
}
