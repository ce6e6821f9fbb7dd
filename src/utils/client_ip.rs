//! Client address extraction for rate limiting.

use std::net::{IpAddr, SocketAddr};

use axum::http::HeaderMap;

use crate::AppError;

const X_FORWARDED_FOR: &str = "x-forwarded-for";
const X_REAL_IP: &str = "x-real-ip";

/// Derives the rate-limit key for a request.
///
/// The key is the client IP without port. When `trust_proxy_headers` is set,
/// the first `X-Forwarded-For` entry (or `X-Real-IP`) wins over the socket peer.
///
/// # Errors
///
/// Returns [`AppError::Internal`] if:
/// - A trusted proxy header is present but does not hold an IP address
/// - No peer address is available for the connection
pub fn client_key(
    headers: &HeaderMap,
    peer: Option<SocketAddr>,
    trust_proxy_headers: bool,
) -> Result<String, AppError> {
    if trust_proxy_headers && let Some(ip) = forwarded_ip(headers)? {
        return Ok(ip.to_string());
    }

    peer.map(|addr| addr.ip().to_string())
        .ok_or_else(|| AppError::internal("client address unavailable on connection"))
}

fn forwarded_ip(headers: &HeaderMap) -> Result<Option<IpAddr>, AppError> {
    let raw = match headers.get(X_FORWARDED_FOR).or_else(|| headers.get(X_REAL_IP)) {
        Some(value) => value,
        None => return Ok(None),
    };

    let first = raw
        .to_str()
        .ok()
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .unwrap_or_default();

    first
        .parse::<IpAddr>()
        .map(Some)
        .map_err(|_| AppError::internal(format!("malformed forwarded client address: {first:?}")))
}
