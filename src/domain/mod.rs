//! Domain layer: entities and repository interfaces.
//!
//! The domain layer has no dependencies on infrastructure or presentation
//! layers. Repository traits define the contracts implemented by
//! `crate::infrastructure::persistence`.
//!
//! - [`entities`] - Core data structures
//! - [`repositories`] - Data access trait definitions
//! - [`mailer`] - Outbound mail port

pub mod entities;
pub mod mailer;
pub mod repositories;
