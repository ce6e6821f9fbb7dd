//! DTOs for the token endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::entities::IssuedToken;

/// Request body for `POST /v1/tokens/authentication`.
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CreateTokenRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,

    #[validate(length(min = 8, max = 72, message = "must be between 8 and 72 bytes long"))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
    pub expiry: DateTime<Utc>,
}

/// `{"authentication_token": {...}}`
#[derive(Debug, Serialize)]
pub struct AuthenticationTokenEnvelope {
    pub authentication_token: TokenResponse,
}

impl From<IssuedToken> for AuthenticationTokenEnvelope {
    fn from(issued: IssuedToken) -> Self {
        AuthenticationTokenEnvelope {
            authentication_token: TokenResponse {
                token: issued.plaintext,
                expiry: issued.expiry,
            },
        }
    }
}
