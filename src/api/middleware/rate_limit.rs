//! Per-client rate limiting middleware.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{ConnectInfo, Request, State, rejection::ExtensionRejection},
    middleware::Next,
    response::Response,
};

use crate::error::AppError;
use crate::infrastructure::rate_limit::RateLimiter;
use crate::utils::client_ip::client_key;

/// Admits or rejects a request against its client's token bucket.
///
/// # Key Extraction
///
/// Rate limits are applied per client IP address, taken from the socket peer
/// address, or from `X-Forwarded-For` / `X-Real-IP` when the limiter trusts
/// proxy headers.
///
/// # Errors
///
/// - `429 Too Many Requests` when the bucket is empty
/// - `500 Internal Server Error` when no client address can be derived
///
/// # Example
///
/// ```rust,ignore
/// let app = Router::new()
///     .route("/movies", get(list_movies_handler))
///     .layer(middleware::from_fn_with_state(limiter, rate_limit::layer));
/// ```
pub async fn layer(
    State(limiter): State<Arc<RateLimiter>>,
    peer: Result<ConnectInfo<SocketAddr>, ExtensionRejection>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let peer = peer.ok().map(|ConnectInfo(addr)| addr);
    let key = client_key(
        req.headers(),
        peer,
        limiter.settings().trust_proxy_headers,
    )?;

    if !limiter.admit(&key) {
        metrics::counter!("http_rate_limited_total").increment(1);
        tracing::debug!(client = %key, "Rate limit exceeded");
        return Err(AppError::RateLimitExceeded);
    }

    Ok(next.run(req).await)
}
