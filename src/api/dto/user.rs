//! DTOs for the user endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::application::services::user_service::Registration;
use crate::domain::entities::User;

/// Request body for `POST /v1/users`.
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct RegisterUserRequest {
    #[validate(length(min = 1, max = 500, message = "must be between 1 and 500 bytes long"))]
    pub name: String,

    #[validate(email(message = "must be a valid email address"))]
    pub email: String,

    #[validate(length(min = 8, max = 72, message = "must be between 8 and 72 bytes long"))]
    pub password: String,
}

impl From<RegisterUserRequest> for Registration {
    fn from(req: RegisterUserRequest) -> Self {
        Registration {
            name: req.name,
            email: req.email,
            password: req.password,
        }
    }
}

/// Request body for `PUT /v1/users/activated`.
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct ActivateUserRequest {
    #[validate(length(equal = 24, message = "must be 24 bytes long"))]
    pub token: String,
}

/// JSON representation of a user. The password hash never leaves the store layer.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub name: String,
    pub email: String,
    pub activated: bool,
}

/// `{"user": {...}}`
#[derive(Debug, Serialize)]
pub struct UserEnvelope {
    pub user: UserResponse,
}

impl From<User> for UserEnvelope {
    fn from(user: User) -> Self {
        UserEnvelope {
            user: UserResponse {
                id: user.id,
                created_at: user.created_at,
                name: user.name,
                email: user.email,
                activated: user.activated,
            },
        }
    }
}
