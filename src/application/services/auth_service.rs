//! Authentication service for bearer tokens.

use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::sync::Arc;

use crate::domain::entities::{IssuedToken, NewToken, TokenScope, User};
use crate::domain::repositories::{TokenRepository, UserRepository};
use crate::error::AppError;
use crate::utils::password::verify_password;
use crate::utils::token_generator::{generate_token, is_well_formed};

type HmacSha256 = Hmac<Sha256>;

/// Default lifetime of an authentication token.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::hours(24);

/// Lifetime of an account activation token.
pub const ACTIVATION_TOKEN_TTL: Duration = Duration::days(3);

/// Service resolving bearer tokens to users and issuing new tokens.
///
/// Tokens are hashed with HMAC-SHA256 (keyed by `signing_secret`) before storage
/// and comparison. An attacker with read-only access to the database cannot verify
/// or forge tokens without the server-side secret.
pub struct AuthService<U: UserRepository + ?Sized, T: TokenRepository + ?Sized> {
    users: Arc<U>,
    tokens: Arc<T>,
    signing_secret: String,
    token_ttl: Duration,
}

impl<U: UserRepository + ?Sized, T: TokenRepository + ?Sized> AuthService<U, T> {
    /// Creates a new authentication service.
    ///
    /// # Arguments
    ///
    /// - `users` - user repository, also resolves token hashes
    /// - `tokens` - token repository for issuing
    /// - `signing_secret` - HMAC key; must match the value used when tokens were created
    /// - `token_ttl` - lifetime of newly issued authentication tokens
    pub fn new(
        users: Arc<U>,
        tokens: Arc<T>,
        signing_secret: String,
        token_ttl: Duration,
    ) -> Self {
        Self {
            users,
            tokens,
            signing_secret,
            token_ttl,
        }
    }

    /// Hashes a raw token with HMAC-SHA256 using the server signing secret.
    ///
    /// Returns a 64-character lowercase hex-encoded MAC.
    pub fn hash_token(&self, token: &str) -> Result<String, AppError> {
        hash_token(&self.signing_secret, token)
    }

    /// Resolves a presented bearer token to its user.
    ///
    /// The shape check runs first, so malformed tokens never reach the store.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InvalidCredentials`] if:
    /// - Token is empty, has the wrong length or uses characters outside the token alphabet
    /// - Token hash does not match any stored authentication token
    /// - Token has expired
    ///
    /// Returns [`AppError::Internal`] on store failures.
    pub async fn authenticate(&self, token: &str) -> Result<User, AppError> {
        self.user_for_token(TokenScope::Authentication, token)
            .await?
            .ok_or(AppError::InvalidCredentials)
    }

    /// Finds the owner of an unexpired token of `scope`.
    ///
    /// Returns `Ok(None)` for malformed, unknown and expired tokens alike.
    pub async fn user_for_token(
        &self,
        scope: TokenScope,
        token: &str,
    ) -> Result<Option<User>, AppError> {
        if !is_well_formed(token) {
            return Ok(None);
        }

        let token_hash = self.hash_token(token)?;

        self.users
            .find_for_token(scope, &token_hash, Utc::now())
            .await
    }

    /// Exchanges an email and password for a new authentication token.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InvalidLoginCredentials`] if the email is unknown or
    /// the password does not match.
    pub async fn issue_authentication_token(
        &self,
        email: &str,
        password: &str,
    ) -> Result<IssuedToken, AppError> {
        let credentials = self
            .users
            .find_by_email(email)
            .await?
            .ok_or(AppError::InvalidLoginCredentials)?;

        let password = password.to_owned();
        let stored_hash = credentials.password_hash;
        let matches =
            tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash))
                .await
                .map_err(|e| AppError::internal(format!("password check task failed: {e}")))?
                .map_err(|e| AppError::internal(format!("unreadable password hash: {e}")))?;

        if !matches {
            return Err(AppError::InvalidLoginCredentials);
        }

        self.issue_token(credentials.user.id, TokenScope::Authentication)
            .await
    }

    /// Generates and stores a token for `user_id`, returning the plaintext once.
    pub async fn issue_token(
        &self,
        user_id: i64,
        scope: TokenScope,
    ) -> Result<IssuedToken, AppError> {
        let plaintext = generate_token()
            .map_err(|e| AppError::internal(format!("token generation failed: {e}")))?;
        let ttl = match scope {
            TokenScope::Authentication => self.token_ttl,
            TokenScope::Activation => ACTIVATION_TOKEN_TTL,
        };
        let expiry = Utc::now() + ttl;

        self.tokens
            .insert(NewToken {
                hash: self.hash_token(&plaintext)?,
                user_id,
                expiry,
                scope,
            })
            .await?;

        tracing::info!(user_id, scope = scope.as_str(), "Issued token");

        Ok(IssuedToken { plaintext, expiry })
    }

    /// Deletes all of a user's tokens of `scope`.
    pub async fn revoke_all(&self, user_id: i64, scope: TokenScope) -> Result<(), AppError> {
        let removed = self.tokens.delete_all_for_user(scope, user_id).await?;
        tracing::debug!(user_id, scope = scope.as_str(), removed, "Revoked tokens");
        Ok(())
    }
}

/// HMAC-SHA256 of `token` keyed with `secret`, hex encoded.
pub fn hash_token(secret: &str, token: &str) -> Result<String, AppError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| AppError::internal(format!("invalid signing key: {e}")))?;
    mac.update(token.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::UserCredentials;
    use crate::domain::repositories::{MockTokenRepository, MockUserRepository};
    use crate::utils::password::hash_password;

    const TOKEN: &str = "Y3QMGX3PJ3WLRL2YRTQGQ6KR";

    fn test_secret() -> String {
        "test-signing-secret".to_string()
    }

    fn user(activated: bool) -> User {
        User {
            id: 1,
            created_at: Utc::now(),
            name: "Faith".to_string(),
            email: "faith@example.com".to_string(),
            activated,
        }
    }

    fn service(
        users: MockUserRepository,
        tokens: MockTokenRepository,
    ) -> AuthService<MockUserRepository, MockTokenRepository> {
        AuthService::new(
            Arc::new(users),
            Arc::new(tokens),
            test_secret(),
            DEFAULT_TOKEN_TTL,
        )
    }

    #[tokio::test]
    async fn test_authenticate_success() {
        let mut users = MockUserRepository::new();
        let expected_hash = hash_token(&test_secret(), TOKEN).unwrap();

        users
            .expect_find_for_token()
            .withf(move |scope, hash, _| {
                *scope == TokenScope::Authentication && hash == &expected_hash
            })
            .times(1)
            .returning(|_, _, _| Ok(Some(user(true))));

        let service = service(users, MockTokenRepository::new());

        let resolved = service.authenticate(TOKEN).await.unwrap();
        assert_eq!(resolved.id, 1);
    }

    #[tokio::test]
    async fn test_unknown_or_expired_token() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_for_token()
            .times(1)
            .returning(|_, _, _| Ok(None));

        let service = service(users, MockTokenRepository::new());

        let result = service.authenticate(TOKEN).await;
        assert!(matches!(result, Err(AppError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_malformed_token_skips_store() {
        let mut users = MockUserRepository::new();
        users.expect_find_for_token().never();

        let service = service(users, MockTokenRepository::new());

        for token in ["", "short", "Y3QMGX3PJ3WLRL2YRTQGQ6K=", "Y3QMGX3PJ3WLRL2YRTQGQ6KRX"] {
            let result = service.authenticate(token).await;
            assert!(matches!(result, Err(AppError::InvalidCredentials)));
        }
    }

    #[tokio::test]
    async fn test_store_failure_is_internal() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_for_token()
            .returning(|_, _, _| Err(AppError::internal("connection reset")));

        let service = service(users, MockTokenRepository::new());

        let result = service.authenticate(TOKEN).await;
        assert!(matches!(result, Err(AppError::Internal { .. })));
    }

    #[tokio::test]
    async fn test_issue_token_with_valid_password() {
        let password_hash = hash_password("pa55word").unwrap();

        let mut users = MockUserRepository::new();
        users.expect_find_by_email().returning(move |_| {
            Ok(Some(UserCredentials {
                user: user(true),
                password_hash: password_hash.clone(),
            }))
        });

        let mut tokens = MockTokenRepository::new();
        tokens
            .expect_insert()
            .withf(|t| t.user_id == 1 && t.scope == TokenScope::Authentication && t.hash.len() == 64)
            .times(1)
            .returning(|_| Ok(()));

        let service = service(users, tokens);

        let issued = service
            .issue_authentication_token("faith@example.com", "pa55word")
            .await
            .unwrap();

        assert!(is_well_formed(&issued.plaintext));
        assert!(issued.expiry > Utc::now() + Duration::hours(23));
    }

    #[tokio::test]
    async fn test_issue_token_wrong_password() {
        let password_hash = hash_password("pa55word").unwrap();

        let mut users = MockUserRepository::new();
        users.expect_find_by_email().returning(move |_| {
            Ok(Some(UserCredentials {
                user: user(true),
                password_hash: password_hash.clone(),
            }))
        });

        let mut tokens = MockTokenRepository::new();
        tokens.expect_insert().never();

        let service = service(users, tokens);

        let result = service
            .issue_authentication_token("faith@example.com", "wrong")
            .await;
        assert!(matches!(result, Err(AppError::InvalidLoginCredentials)));
    }

    #[tokio::test]
    async fn test_issue_token_unknown_email() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_email().returning(|_| Ok(None));

        let service = service(users, MockTokenRepository::new());

        let result = service
            .issue_authentication_token("nobody@example.com", "pa55word")
            .await;
        assert!(matches!(result, Err(AppError::InvalidLoginCredentials)));
    }

    #[tokio::test]
    async fn test_activation_token_is_scoped_and_longer_lived() {
        let mut tokens = MockTokenRepository::new();
        tokens
            .expect_insert()
            .withf(|t| t.scope == TokenScope::Activation)
            .times(1)
            .returning(|_| Ok(()));

        let service = service(MockUserRepository::new(), tokens);

        let issued = service
            .issue_token(1, TokenScope::Activation)
            .await
            .unwrap();

        assert!(issued.expiry > Utc::now() + Duration::days(2));
    }

    #[tokio::test]
    async fn test_activation_token_does_not_authenticate() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_for_token()
            .withf(|scope, _, _| *scope == TokenScope::Authentication)
            .times(1)
            .returning(|_, _, _| Ok(None));

        let service = service(users, MockTokenRepository::new());

        let result = service.authenticate(TOKEN).await;
        assert!(matches!(result, Err(AppError::InvalidCredentials)));
    }

    #[test]
    fn test_hash_token_consistency() {
        let hash1 = hash_token(&test_secret(), "test-token").unwrap();
        let hash2 = hash_token(&test_secret(), "test-token").unwrap();

        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
        assert_ne!(hash1, hash_token(&test_secret(), "token2").unwrap());
    }

    #[test]
    fn test_hash_token_secret_matters() {
        assert_ne!(
            hash_token("secret-a", "token").unwrap(),
            hash_token("secret-b", "token").unwrap()
        );
    }
}
