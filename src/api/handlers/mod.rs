//! HTTP request handlers for API endpoints.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod fallback;
pub mod health;
pub mod movies;
pub mod tokens;
pub mod users;

pub use fallback::{method_not_allowed_handler, not_found_handler};
pub use health::health_handler;
pub use movies::{
    create_movie_handler, delete_movie_handler, list_movies_handler, show_movie_handler,
    update_movie_handler,
};
pub use tokens::create_authentication_token_handler;
pub use users::{activate_user_handler, register_user_handler};
