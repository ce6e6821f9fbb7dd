//! Application layer services implementing business logic.
//!
//! This layer orchestrates domain operations by coordinating repository calls,
//! validation, and business rules. Services consume repository traits and provide
//! a clean API for HTTP handlers and middleware.
//!
//! # Available Services
//!
//! - [`services::movie_service::MovieService`] - Catalog CRUD with version-guarded updates
//! - [`services::auth_service::AuthService`] - Bearer token resolution and issuing
//! - [`services::permission_service::PermissionService`] - Permission lookups
//! - [`services::user_service::UserService`] - Registration and account activation
//!
//! [`gates`] holds the authorization checks composed per route.

pub mod gates;
pub mod services;
