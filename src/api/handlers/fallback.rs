use axum::http::{Method, Uri};
use serde_json::json;

use crate::error::AppError;

/// Unknown routes get the standard error envelope.
pub async fn not_found_handler(uri: Uri) -> AppError {
    AppError::not_found(
        "the requested resource could not be found",
        json!({ "path": uri.path() }),
    )
}

/// A known path hit with an unsupported method gets the standard error envelope.
pub async fn method_not_allowed_handler(method: Method) -> AppError {
    AppError::MethodNotAllowed {
        method: method.to_string(),
    }
}
