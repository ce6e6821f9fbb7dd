//! HTTP middleware for request processing and protection.
//!
//! Outermost to innermost: [`recover`], [`tracing`], [`timeout`], [`cors`],
//! [`rate_limit`], [`authenticate`], then [`authorize`] on each gated route.

pub mod authenticate;
pub mod authorize;
pub mod cors;
pub mod rate_limit;
pub mod recover;
pub mod timeout;
pub mod tracing;
