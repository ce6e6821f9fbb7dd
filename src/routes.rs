//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `/v1/*` - JSON API
//! - anything else - `404` in the standard error envelope
//!
//! # Middleware
//!
//! Outermost first:
//!
//! - **Panic containment** - a panic anywhere below becomes a `500` with `Connection: close`
//! - **Tracing** - Structured request/response logging
//! - **Timeout** - `503` in the error envelope once the request deadline passes
//! - **CORS** - Trusted origins only (when configured)
//! - **Rate limiting** - Per-client token bucket (when enabled)
//! - **Authentication** - Bearer token to [`crate::domain::entities::Identity`]
//! - **Authorization** - Per-route gate chains (see [`crate::api::routes`])

use std::sync::Arc;
use std::time::Duration;

use axum::{Router, middleware};

use crate::api;
use crate::api::handlers::not_found_handler;
use crate::api::middleware::{authenticate, cors, rate_limit, recover, timeout, tracing};
use crate::infrastructure::rate_limit::RateLimiter;
use crate::state::AppState;

/// Constructs the application router with all routes and middleware.
///
/// # Arguments
///
/// - `state` - shared application state injected into all handlers
/// - `limiter` - per-client rate limiter; `None` disables rate limiting
/// - `cors_origins` - trusted CORS origins; empty disables CORS handling
/// - `request_timeout` - deadline for producing a response
pub fn app_router(
    state: AppState,
    limiter: Option<Arc<RateLimiter>>,
    cors_origins: &[String],
    request_timeout: Duration,
) -> Router {
    let mut router = Router::new()
        .nest("/v1", api::routes::v1_routes(&state))
        .fallback(not_found_handler)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            authenticate::layer,
        ))
        .with_state(state);

    if let Some(limiter) = limiter {
        router = router.layer(middleware::from_fn_with_state(limiter, rate_limit::layer));
    }

    if let Some(cors) = cors::layer(cors_origins) {
        router = router.layer(cors);
    }

    router
        .layer(middleware::from_fn_with_state(
            request_timeout,
            timeout::layer,
        ))
        .layer(tracing::layer())
        .layer(recover::layer())
}
