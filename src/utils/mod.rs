//! Utility functions used across the application.
//!
//! - [`token_generator`] - Bearer token generation and shape checks
//! - [`password`] - Argon2id password hashing
//! - [`client_ip`] - Client address extraction for rate limiting

pub mod client_ip;
pub mod password;
pub mod token_generator;
