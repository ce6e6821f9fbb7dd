//! API route configuration.
//!
//! Every movie route carries its own [`GateChain`], checked by
//! [`crate::api::middleware::authorize`] after authentication.

use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{delete, get, patch, post, put},
};

use crate::api::handlers::{
    activate_user_handler, create_authentication_token_handler, create_movie_handler,
    delete_movie_handler, health_handler, list_movies_handler, method_not_allowed_handler,
    register_user_handler, show_movie_handler, update_movie_handler,
};
use crate::api::middleware::authorize;
use crate::application::gates::GateChain;
use crate::domain::entities::{MOVIES_READ, MOVIES_WRITE};
use crate::state::AppState;

/// All `/v1` routes.
///
/// # Endpoints
///
/// - `GET    /healthcheck`            - Service status (public)
/// - `GET    /movies`                 - List movies (`movies:read`)
/// - `GET    /movies/{id}`            - Show a movie (`movies:read`)
/// - `POST   /movies`                 - Create a movie (`movies:write`)
/// - `PATCH  /movies/{id}`            - Update a movie (`movies:write`)
/// - `DELETE /movies/{id}`            - Delete a movie (`movies:write`)
/// - `POST   /users`                  - Register an inactive user (public)
/// - `PUT    /users/activated`        - Activate a user by token (public)
/// - `POST   /tokens/authentication`  - Issue a bearer token (public)
///
/// A known path hit with another method answers `405` in the error envelope.
pub fn v1_routes(state: &AppState) -> Router<AppState> {
    let read = Arc::new(GateChain::permission(
        MOVIES_READ,
        state.permission_service.clone(),
    ));
    let write = Arc::new(GateChain::permission(
        MOVIES_WRITE,
        state.permission_service.clone(),
    ));

    let gated = |chain: &Arc<GateChain>| {
        middleware::from_fn_with_state(chain.clone(), authorize::layer)
    };

    Router::new()
        .route("/healthcheck", get(health_handler))
        .route("/movies", get(list_movies_handler).route_layer(gated(&read)))
        .route("/movies", post(create_movie_handler).route_layer(gated(&write)))
        .route("/movies/{id}", get(show_movie_handler).route_layer(gated(&read)))
        .route(
            "/movies/{id}",
            patch(update_movie_handler).route_layer(gated(&write)),
        )
        .route(
            "/movies/{id}",
            delete(delete_movie_handler).route_layer(gated(&write)),
        )
        .route("/users", post(register_user_handler))
        .route("/users/activated", put(activate_user_handler))
        .route(
            "/tokens/authentication",
            post(create_authentication_token_handler),
        )
        .method_not_allowed_fallback(method_not_allowed_handler)
}
