//! Core domain entities.
//!
//! Entities are plain data structures. Separate structs are used for creation
//! (`NewMovie`, `NewUser`, `NewToken`) and partial updates (`MoviePatch`).
//!
//! - [`Movie`] - the versioned catalog record
//! - [`User`] - a registered account
//! - [`Identity`] - the caller attached to a request
//! - [`Permissions`] - permission codes granted to a user

pub mod identity;
pub mod movie;
pub mod permission;
pub mod token;
pub mod user;

pub use identity::{ANONYMOUS_USER_ID, Identity};
pub use movie::{Movie, MoviePatch, NewMovie, Runtime};
pub use permission::{MOVIES_READ, MOVIES_WRITE, Permissions};
pub use token::{IssuedToken, NewToken, TokenScope};
pub use user::{NewUser, User, UserCredentials};
