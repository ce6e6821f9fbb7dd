//! Handler for health check endpoint.

use axum::{Json, extract::State};

use crate::api::dto::health::{HealthResponse, SystemInfo};
use crate::state::AppState;

/// Reports that the service is up.
///
/// # Endpoint
///
/// `GET /v1/healthcheck`
///
/// # Response
///
/// ```json
/// {"status": "available", "system_info": {"environment": "development", "version": "0.1.0"}}
/// ```
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "available",
        system_info: SystemInfo {
            environment: state.environment.clone(),
            version: env!("CARGO_PKG_VERSION"),
        },
    })
}
