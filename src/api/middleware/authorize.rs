//! Per-route authorization middleware.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::application::gates::GateChain;
use crate::domain::entities::Identity;
use crate::error::AppError;

/// Runs the route's [`GateChain`] against the identity attached by
/// [`crate::api::middleware::authenticate::layer`].
///
/// # Example
///
/// ```rust,ignore
/// let read = Arc::new(GateChain::permission(MOVIES_READ, permissions));
///
/// Router::new()
///     .route("/movies", get(list_movies_handler))
///     .route_layer(middleware::from_fn_with_state(read, authorize::layer));
/// ```
pub async fn layer(
    State(chain): State<Arc<GateChain>>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let identity = req
        .extensions()
        .get::<Identity>()
        .ok_or_else(|| AppError::internal("authorization ran without an identity"))?;

    chain.check(identity).await?;

    Ok(next.run(req).await)
}
