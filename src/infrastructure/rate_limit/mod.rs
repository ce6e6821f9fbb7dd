//! Per-client rate limiting.
//!
//! [`RateLimiter`] owns a [`ClientRegistry`] of token buckets keyed by client
//! address and a background sweeper that drops buckets idle past a threshold.

mod registry;

pub use registry::ClientRegistry;

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Rate limiter settings resolved from configuration.
#[derive(Debug, Clone)]
pub struct RateLimitSettings {
    pub enabled: bool,
    pub rps: f64,
    pub burst: u32,
    pub sweep_interval: Duration,
    pub idle_timeout: Duration,
    pub trust_proxy_headers: bool,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            rps: 2.0,
            burst: 4,
            sweep_interval: Duration::from_secs(60),
            idle_timeout: Duration::from_secs(180),
            trust_proxy_headers: false,
        }
    }
}

/// Shared rate limiter handed to the HTTP middleware.
pub struct RateLimiter {
    registry: ClientRegistry,
    settings: RateLimitSettings,
}

impl RateLimiter {
    pub fn new(settings: RateLimitSettings) -> Result<Self> {
        let burst = NonZeroU32::new(settings.burst).context("limiter burst must be at least 1")?;
        let registry = ClientRegistry::new(settings.rps, burst)
            .context("limiter rate must be a positive number of requests per second")?;

        Ok(Self { registry, settings })
    }

    /// Returns `true` if the client identified by `key` may proceed.
    pub fn admit(&self, key: &str) -> bool {
        self.registry.admit(key)
    }

    pub fn settings(&self) -> &RateLimitSettings {
        &self.settings
    }

    pub fn registry(&self) -> &ClientRegistry {
        &self.registry
    }

    /// Runs one eviction pass and returns how many clients were dropped.
    pub fn sweep(&self) -> usize {
        let removed = self.registry.evict_idle(self.settings.idle_timeout);

        if removed > 0 {
            metrics::counter!("rate_limit_clients_evicted_total").increment(removed as u64);
        }
        tracing::debug!(
            removed,
            tracked = self.registry.len(),
            "Rate limiter sweep finished"
        );

        removed
    }

    /// Starts the periodic eviction task. Abort the handle to stop it.
    pub fn spawn_sweeper(self: &Arc<Self>) -> JoinHandle<()> {
        let limiter = Arc::clone(self);
        let period = limiter.settings.sweep_interval;

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                limiter.sweep();
            }
        })
    }
}
