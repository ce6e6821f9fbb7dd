//! Repository trait definitions for the domain layer.
//!
//! These traits are the seams between the request pipeline and its external
//! stores. Implementations live in `crate::infrastructure::persistence`;
//! mock implementations are generated via `mockall` for unit tests.
//!
//! # Available Repositories
//!
//! - [`MovieRepository`] - Catalog CRUD with version-checked updates
//! - [`UserRepository`] - User accounts and token-to-user resolution
//! - [`TokenRepository`] - Bearer token storage
//! - [`PermissionRepository`] - User permission sets

pub mod movie_repository;
pub mod permission_repository;
pub mod token_repository;
pub mod user_repository;

pub use movie_repository::{MovieFilter, MovieRepository, MovieSort, SortColumn};
pub use permission_repository::PermissionRepository;
pub use token_repository::TokenRepository;
pub use user_repository::UserRepository;

#[cfg(test)]
pub use movie_repository::MockMovieRepository;
#[cfg(test)]
pub use permission_repository::MockPermissionRepository;
#[cfg(test)]
pub use token_repository::MockTokenRepository;
#[cfg(test)]
pub use user_repository::MockUserRepository;
