//! Application error type and its HTTP mapping.
//!
//! Every failure a request can hit ends up as an [`AppError`]. Client-facing
//! variants map to a fixed status code and a stable message; [`AppError::Internal`]
//! is logged with full detail and rendered as one generic message.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Map, Value, json};
use thiserror::Error;
use validator::ValidationErrors;

/// Message returned for every internal error. Details stay in the server log.
pub const INTERNAL_ERROR_MESSAGE: &str =
    "the server encountered a problem and could not process your request";

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

/// Serializable error payload, also embedded in batch-style responses.
#[derive(Debug, Serialize)]
pub struct ErrorInfo {
    pub code: &'static str,
    pub message: String,
    pub details: Value,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("rate limit exceeded")]
    RateLimitExceeded,

    /// Malformed, unknown or expired bearer token.
    #[error("invalid or missing authentication token")]
    InvalidCredentials,

    /// Email/password pair rejected while issuing a token.
    #[error("invalid authentication credentials")]
    InvalidLoginCredentials,

    #[error("you must be authenticated to access this resource")]
    AuthenticationRequired,

    #[error("your user account must be activated to access this resource")]
    AccountInactive,

    #[error("your user account doesn't have the necessary permissions to access this resource")]
    NotPermitted,

    #[error("{message}")]
    Validation { message: String, details: Value },

    #[error("{message}")]
    NotFound { message: String, details: Value },

    #[error("the {method} method is not supported for this resource")]
    MethodNotAllowed { method: String },

    #[error("the server took too long to process your request")]
    RequestTimeout,

    #[error("unable to update the record due to an edit conflict, please try again")]
    EditConflict,

    #[error("{message}")]
    Conflict { message: String, details: Value },

    #[error("internal error: {detail}")]
    Internal { detail: String },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }

    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }

    pub fn conflict(message: impl Into<String>, details: Value) -> Self {
        Self::Conflict {
            message: message.into(),
            details,
        }
    }

    /// Internal failure. `detail` is logged, never sent to the client.
    pub fn internal(detail: impl Into<String>) -> Self {
        Self::Internal {
            detail: detail.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            AppError::InvalidCredentials
            | AppError::InvalidLoginCredentials
            | AppError::AuthenticationRequired => StatusCode::UNAUTHORIZED,
            AppError::AccountInactive | AppError::NotPermitted => StatusCode::FORBIDDEN,
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            AppError::RequestTimeout => StatusCode::SERVICE_UNAVAILABLE,
            AppError::EditConflict | AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code for the `error.code` field.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::RateLimitExceeded => "rate_limit_exceeded",
            AppError::InvalidCredentials => "invalid_token",
            AppError::InvalidLoginCredentials => "invalid_credentials",
            AppError::AuthenticationRequired => "authentication_required",
            AppError::AccountInactive => "account_inactive",
            AppError::NotPermitted => "not_permitted",
            AppError::Validation { .. } => "validation_error",
            AppError::NotFound { .. } => "not_found",
            AppError::MethodNotAllowed { .. } => "method_not_allowed",
            AppError::RequestTimeout => "request_timeout",
            AppError::EditConflict => "edit_conflict",
            AppError::Conflict { .. } => "conflict",
            AppError::Internal { .. } => "internal_error",
        }
    }

    /// Builds the client-visible payload. Internal details are dropped here.
    pub fn to_error_info(&self) -> ErrorInfo {
        let (message, details) = match self {
            AppError::Validation { message, details }
            | AppError::NotFound { message, details }
            | AppError::Conflict { message, details } => (message.clone(), details.clone()),
            AppError::Internal { .. } => (INTERNAL_ERROR_MESSAGE.to_string(), json!({})),
            other => (other.to_string(), json!({})),
        };

        ErrorInfo {
            code: self.code(),
            message,
            details,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::Internal { detail } = &self {
            tracing::error!(error = %detail, "Internal server error");
        }

        let status = self.status();
        let body = ErrorBody {
            error: self.to_error_info(),
        };

        let mut response = (status, Json(body)).into_response();

        if matches!(self, AppError::InvalidCredentials) {
            response.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                HeaderValue::from_static("Bearer"),
            );
        }

        response
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        if let Some(db) = e.as_database_error()
            && db.is_unique_violation()
        {
            return AppError::conflict(
                "Unique constraint violation",
                json!({ "constraint": db.constraint() }),
            );
        }

        AppError::internal(format!("database error: {e}"))
    }
}

impl From<tokio::time::error::Elapsed> for AppError {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        AppError::internal("store call exceeded its timeout")
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields = Map::new();

        for (field, errs) in errors.field_errors() {
            let messages = errs
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string())
                })
                .collect::<Vec<_>>();
            fields.insert(field.to_string(), json!(messages));
        }

        AppError::bad_request("Validation failed", Value::Object(fields))
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::bad_request(
            "Malformed request body",
            json!({ "reason": rejection.body_text() }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::ValidationError;

    #[test]
    fn test_status_codes_follow_taxonomy() {
        assert_eq!(
            AppError::RateLimitExceeded.status(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            AppError::InvalidCredentials.status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::AuthenticationRequired.status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AppError::AccountInactive.status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::NotPermitted.status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::EditConflict.status(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::MethodNotAllowed {
                method: "PUT".to_string()
            }
            .status(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(
            AppError::RequestTimeout.status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            AppError::internal("boom").status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_detail_is_not_exposed() {
        let info = AppError::internal("connection refused on 10.0.0.3:5432").to_error_info();

        assert_eq!(info.code, "internal_error");
        assert_eq!(info.message, INTERNAL_ERROR_MESSAGE);
        assert!(!info.message.contains("10.0.0.3"));
    }

    #[test]
    fn test_method_not_allowed_names_the_method() {
        let info = AppError::MethodNotAllowed {
            method: "PUT".to_string(),
        }
        .to_error_info();

        assert_eq!(info.code, "method_not_allowed");
        assert_eq!(
            info.message,
            "the PUT method is not supported for this resource"
        );
    }

    #[test]
    fn test_invalid_credentials_sets_www_authenticate() {
        let response = AppError::InvalidCredentials.into_response();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Bearer"
        );
    }

    #[test]
    fn test_validation_errors_are_grouped_by_field() {
        let mut errors = ValidationErrors::new();
        errors.add(
            "title",
            ValidationError::new("required").with_message("must be provided".into()),
        );
        errors.add(
            "year",
            ValidationError::new("range").with_message("must be greater than 1888".into()),
        );

        let err = AppError::from(errors);
        let info = err.to_error_info();

        assert_eq!(info.code, "validation_error");
        assert_eq!(info.details["title"][0], "must be provided");
        assert_eq!(info.details["year"][0], "must be greater than 1888");
    }
}
