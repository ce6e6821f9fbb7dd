//! Business logic services for the application layer.

pub mod auth_service;
pub mod movie_service;
pub mod permission_service;
pub mod user_service;

pub use auth_service::AuthService;
pub use movie_service::MovieService;
pub use permission_service::PermissionService;
pub use user_service::UserService;
