//! Bearer token authentication middleware.

use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderValue, header},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::domain::entities::Identity;
use crate::{error::AppError, state::AppState};

/// Resolves the caller of every request to an [`Identity`].
///
/// # Header Format
///
/// ```text
/// Authorization: Bearer <token>
/// ```
///
/// # Authentication Flow
///
/// 1. No `Authorization` header, or an empty one: the request continues as [`Identity::Anonymous`]
/// 2. Header must be exactly `Bearer` and one token separated by a single space
/// 3. Token is shape-checked, hashed and looked up among unexpired authentication tokens
/// 4. The owning user is attached to the request extensions
///
/// Authorization decisions are left to the gates further in.
///
/// # Errors
///
/// Returns `401 Unauthorized` with `WWW-Authenticate: Bearer` if the header is
/// malformed or the token is unknown or expired, and `500` on store failures.
///
/// `Vary: Authorization` is added to every response that passes through here.
pub async fn layer(State(st): State<AppState>, mut req: Request, next: Next) -> Response {
    let mut response = match resolve_identity(&st, req.headers()).await {
        Ok(identity) => {
            req.extensions_mut().insert(identity);
            next.run(req).await
        }
        Err(e) => e.into_response(),
    };

    response
        .headers_mut()
        .append(header::VARY, HeaderValue::from_static("Authorization"));

    response
}

async fn resolve_identity(st: &AppState, headers: &HeaderMap) -> Result<Identity, AppError> {
    let Some(token) = bearer_token(headers)? else {
        return Ok(Identity::Anonymous);
    };

    let user = st.auth_service.authenticate(token).await?;

    tracing::debug!(user_id = user.id, "Request authenticated");

    Ok(Identity::User(user))
}

/// Extracts the token from the `Authorization` header.
///
/// Returns `Ok(None)` when the header is absent or empty.
pub fn bearer_token(headers: &HeaderMap) -> Result<Option<&str>, AppError> {
    let Some(value) = headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };

    let value = value.to_str().map_err(|_| AppError::InvalidCredentials)?;
    if value.is_empty() {
        return Ok(None);
    }

    let parts: Vec<&str> = value.split(' ').collect();
    match parts.as_slice() {
        ["Bearer", token] => Ok(Some(*token)),
        _ => Err(AppError::InvalidCredentials),
    }
}
