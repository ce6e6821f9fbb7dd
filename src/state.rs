//! Shared application state.

use std::sync::Arc;

use chrono::Duration;

use crate::application::services::{AuthService, MovieService, PermissionService, UserService};
use crate::domain::mailer::Mailer;
use crate::domain::repositories::{
    MovieRepository, PermissionRepository, TokenRepository, UserRepository,
};

/// State injected into every handler and middleware.
///
/// Services hold trait objects so the same router runs against PostgreSQL in
/// production and against in-memory stores in tests.
#[derive(Clone)]
pub struct AppState {
    pub movie_service: Arc<MovieService<dyn MovieRepository>>,
    pub auth_service: Arc<AuthService<dyn UserRepository, dyn TokenRepository>>,
    pub permission_service: Arc<PermissionService<dyn PermissionRepository>>,
    pub user_service:
        Arc<UserService<dyn UserRepository, dyn TokenRepository, dyn PermissionRepository>>,
    pub environment: String,
}

/// Store handles and outbound collaborators the state is assembled from.
pub struct Stores {
    pub movies: Arc<dyn MovieRepository>,
    pub users: Arc<dyn UserRepository>,
    pub tokens: Arc<dyn TokenRepository>,
    pub permissions: Arc<dyn PermissionRepository>,
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    pub fn new(
        stores: Stores,
        signing_secret: String,
        token_ttl: Duration,
        environment: impl Into<String>,
    ) -> Self {
        let auth_service = Arc::new(AuthService::new(
            Arc::clone(&stores.users),
            stores.tokens,
            signing_secret,
            token_ttl,
        ));
        let user_service = Arc::new(UserService::new(
            stores.users,
            Arc::clone(&stores.permissions),
            Arc::clone(&auth_service),
            stores.mailer,
        ));

        Self {
            movie_service: Arc::new(MovieService::new(stores.movies)),
            auth_service,
            permission_service: Arc::new(PermissionService::new(stores.permissions)),
            user_service,
            environment: environment.into(),
        }
    }
}
