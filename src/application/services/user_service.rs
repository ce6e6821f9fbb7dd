//! User registration and account activation.

use std::sync::Arc;

use serde_json::json;

use crate::application::services::AuthService;
use crate::domain::entities::{MOVIES_READ, NewUser, TokenScope, User};
use crate::domain::mailer::Mailer;
use crate::domain::repositories::{PermissionRepository, TokenRepository, UserRepository};
use crate::error::AppError;
use crate::utils::password::hash_password;

/// Input for [`UserService::register`]. The password is plaintext here and
/// only its hash leaves the service.
#[derive(Debug, Clone)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Service for self-service sign up.
///
/// New accounts start inactive with `movies:read` granted. An activation token
/// is mailed in the background; redeeming it through [`Self::activate`]
/// activates the account and invalidates every activation token the user holds.
pub struct UserService<U, T, P>
where
    U: UserRepository + ?Sized,
    T: TokenRepository + ?Sized,
    P: PermissionRepository + ?Sized,
{
    users: Arc<U>,
    permissions: Arc<P>,
    auth: Arc<AuthService<U, T>>,
    mailer: Arc<dyn Mailer>,
}

impl<U, T, P> UserService<U, T, P>
where
    U: UserRepository + ?Sized,
    T: TokenRepository + ?Sized,
    P: PermissionRepository + ?Sized,
{
    pub fn new(
        users: Arc<U>,
        permissions: Arc<P>,
        auth: Arc<AuthService<U, T>>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            users,
            permissions,
            auth,
            mailer,
        }
    }

    /// Creates an inactive account and mails its activation token.
    ///
    /// Mail delivery happens on a separate task; a delivery failure is logged
    /// and does not undo the registration.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the email is already registered.
    pub async fn register(&self, registration: Registration) -> Result<User, AppError> {
        let Registration {
            name,
            email,
            password,
        } = registration;

        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| AppError::internal(format!("password hashing task failed: {e}")))?
            .map_err(|e| AppError::internal(format!("password hashing failed: {e}")))?;

        let user = match self
            .users
            .insert(NewUser {
                name,
                email,
                password_hash,
                activated: false,
            })
            .await
        {
            Ok(user) => user,
            Err(AppError::Conflict { .. }) => {
                return Err(AppError::bad_request(
                    "Validation failed",
                    json!({ "email": ["a user with this email address already exists"] }),
                ));
            }
            Err(e) => return Err(e),
        };

        self.permissions
            .add_for_user(user.id, &[MOVIES_READ.to_string()])
            .await?;

        let token = self.auth.issue_token(user.id, TokenScope::Activation).await?;

        let mailer = Arc::clone(&self.mailer);
        let recipient = user.clone();
        tokio::spawn(async move {
            if let Err(e) = mailer.send_activation(&recipient, &token).await {
                tracing::error!(user_id = recipient.id, error = %e, "Failed to send activation email");
            }
        });

        tracing::info!(user_id = user.id, "User registered");

        Ok(user)
    }

    /// Activates the account owning `token`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the token is malformed, unknown or
    /// expired, and [`AppError::EditConflict`] if the user vanished meanwhile.
    pub async fn activate(&self, token: &str) -> Result<User, AppError> {
        let mut user = self
            .auth
            .user_for_token(TokenScope::Activation, token)
            .await?
            .ok_or_else(|| {
                AppError::bad_request(
                    "Validation failed",
                    json!({ "token": ["invalid or expired activation token"] }),
                )
            })?;

        if !self.users.activate(user.id).await? {
            return Err(AppError::EditConflict);
        }
        user.activated = true;

        self.auth.revoke_all(user.id, TokenScope::Activation).await?;

        tracing::info!(user_id = user.id, "User activated");

        Ok(user)
    }
}
