//! Handlers for self-service registration and activation.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use validator::Validate;

use crate::api::dto::user::{ActivateUserRequest, RegisterUserRequest, UserEnvelope};
use crate::error::AppError;
use crate::state::AppState;

/// Registers a new, inactive user and mails an activation token.
///
/// # Endpoint
///
/// `POST /v1/users`
///
/// # Request Body
///
/// ```json
/// {"name": "Alice", "email": "alice@example.com", "password": "pa55word"}
/// ```
///
/// # Response
///
/// `202 Accepted`. The activation email is sent in the background.
///
/// # Errors
///
/// - 400 Bad Request if a field is invalid or the email is taken
pub async fn register_user_handler(
    State(state): State<AppState>,
    payload: Result<Json<RegisterUserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<UserEnvelope>), AppError> {
    let Json(payload) = payload?;
    payload.validate()?;

    let user = state.user_service.register(payload.into()).await?;

    Ok((StatusCode::ACCEPTED, Json(user.into())))
}

/// Activates the account owning an activation token.
///
/// # Endpoint
///
/// `PUT /v1/users/activated`
///
/// # Errors
///
/// - 400 Bad Request if the token is malformed, unknown or expired
/// - 409 Conflict if the account changed concurrently
pub async fn activate_user_handler(
    State(state): State<AppState>,
    payload: Result<Json<ActivateUserRequest>, JsonRejection>,
) -> Result<Json<UserEnvelope>, AppError> {
    let Json(payload) = payload?;
    payload.validate()?;

    let user = state.user_service.activate(&payload.token).await?;

    Ok(Json(user.into()))
}
