//! Infrastructure layer for external integrations.
//!
//! This layer implements interfaces defined by the domain layer and holds the
//! process-local rate limiter state.
//!
//! # Modules
//!
//! - [`mailer`] - Mail delivery
//! - [`persistence`] - PostgreSQL repository implementations
//! - [`rate_limit`] - Per-client token buckets with idle eviction

pub mod mailer;
pub mod persistence;
pub mod rate_limit;
