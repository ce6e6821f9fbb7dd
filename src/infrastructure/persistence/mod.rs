//! PostgreSQL repository implementations.
//!
//! Concrete implementations of domain repository traits using SQLx runtime
//! queries. Every store call is bounded by the timeout the repository was
//! built with (see [`with_timeout`]).
//!
//! # Repositories
//!
//! - [`PgMovieRepository`] - Catalog storage with version-checked updates
//! - [`PgUserRepository`] - User accounts and token resolution
//! - [`PgTokenRepository`] - Bearer token storage
//! - [`PgPermissionRepository`] - User permission sets

pub mod pg_movie_repository;
pub mod pg_permission_repository;
pub mod pg_token_repository;
pub mod pg_user_repository;

pub use pg_movie_repository::PgMovieRepository;
pub use pg_permission_repository::PgPermissionRepository;
pub use pg_token_repository::PgTokenRepository;
pub use pg_user_repository::PgUserRepository;

use std::future::Future;
use std::time::Duration;

use crate::error::AppError;

/// Default upper bound for a single store call.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

/// Runs a store call, failing with an internal error once `limit` elapses.
pub async fn with_timeout<T, F>(limit: Duration, fut: F) -> Result<T, AppError>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    tokio::time::timeout(limit, fut).await?.map_err(AppError::from)
}
