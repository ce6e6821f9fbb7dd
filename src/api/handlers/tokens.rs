//! Handler for issuing authentication tokens.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use validator::Validate;

use crate::api::dto::token::{AuthenticationTokenEnvelope, CreateTokenRequest};
use crate::error::AppError;
use crate::state::AppState;

/// Exchanges an email and password for a bearer token.
///
/// # Endpoint
///
/// `POST /v1/tokens/authentication`
///
/// # Request Body
///
/// ```json
/// {"email": "alice@example.com", "password": "pa55word"}
/// ```
///
/// # Errors
///
/// - 400 Bad Request if the email or password fails validation
/// - 401 Unauthorized if the credentials don't match a user
pub async fn create_authentication_token_handler(
    State(state): State<AppState>,
    payload: Result<Json<CreateTokenRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AuthenticationTokenEnvelope>), AppError> {
    let Json(payload) = payload?;
    payload.validate()?;

    let issued = state
        .auth_service
        .issue_authentication_token(&payload.email, &payload.password)
        .await?;

    Ok((StatusCode::CREATED, Json(issued.into())))
}
