//! Request deadline enforcement.

use std::time::Duration;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::error::AppError;

/// Deadline applied when `REQUEST_TIMEOUT` is not set.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Fails a request with `503 request_timeout` once `limit` elapses.
///
/// The inner future is dropped on expiry, so handler work still pending at
/// that point is cancelled. Store calls carry their own shorter deadline.
pub async fn layer(
    State(limit): State<Duration>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let path = req.uri().path().to_owned();

    match tokio::time::timeout(limit, next.run(req)).await {
        Ok(response) => Ok(response),
        Err(_) => {
            metrics::counter!("http_requests_timed_out_total").increment(1);
            tracing::warn!(path = %path, limit_ms = limit.as_millis() as u64, "Request timed out");
            Err(AppError::RequestTimeout)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Router,
        body::{Body, to_bytes},
        http::{self, StatusCode},
        middleware,
        routing::get,
    };
    use serde_json::Value;
    use tower::ServiceExt;

    fn app(limit: Duration) -> Router {
        Router::new()
            .route(
                "/slow",
                get(|| async {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    "done"
                }),
            )
            .route("/fast", get(|| async { "done" }))
            .layer(middleware::from_fn_with_state(limit, layer))
    }

    fn get_request(path: &str) -> Request {
        http::Request::builder().uri(path).body(Body::empty()).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_request_times_out_with_envelope() {
        let response = app(Duration::from_secs(5))
            .oneshot(get_request("/slow"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["code"], "request_timeout");
    }

    #[tokio::test(start_paused = true)]
    async fn test_fast_request_passes_through() {
        let response = app(Duration::from_secs(5))
            .oneshot(get_request("/fast"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"done");
    }
}
