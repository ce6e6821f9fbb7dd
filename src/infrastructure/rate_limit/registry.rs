use std::num::NonZeroU32;
use std::time::Duration;

use dashmap::DashMap;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use tokio::time::Instant;

/// Per-client token bucket plus the time it was last touched.
struct ClientBucket {
    limiter: DefaultDirectRateLimiter,
    last_seen: Instant,
}

/// Concurrent map of client key to token bucket.
///
/// Buckets are created lazily on first contact. Each admission locks only the
/// shard holding that key, so unrelated clients never contend. Eviction walks
/// the map shard by shard and never holds the whole map.
pub struct ClientRegistry {
    buckets: DashMap<String, ClientBucket>,
    quota: Quota,
}

impl ClientRegistry {
    /// Builds a registry handing out buckets with `rps` steady refill and `burst` capacity.
    ///
    /// Returns `None` if `rps` is not a positive finite rate, or is so small
    /// that one token period does not fit in a `Duration`.
    pub fn new(rps: f64, burst: NonZeroU32) -> Option<Self> {
        if !rps.is_finite() || rps <= 0.0 {
            return None;
        }

        let period = Duration::try_from_secs_f64(1.0 / rps).ok()?;
        let quota = Quota::with_period(period)?.allow_burst(burst);

        Some(Self {
            buckets: DashMap::new(),
            quota,
        })
    }

    /// Takes one token from the client's bucket.
    ///
    /// Returns `false` when the bucket is empty. The bucket's activity timestamp
    /// is refreshed either way.
    pub fn admit(&self, key: &str) -> bool {
        let now = Instant::now();

        if let Some(mut bucket) = self.buckets.get_mut(key) {
            bucket.last_seen = now;
            return bucket.limiter.check().is_ok();
        }

        let mut bucket = self
            .buckets
            .entry(key.to_owned())
            .or_insert_with(|| ClientBucket {
                limiter: RateLimiter::direct(self.quota),
                last_seen: now,
            });
        bucket.last_seen = now;
        bucket.limiter.check().is_ok()
    }

    /// Removes every bucket idle for longer than `max_idle`.
    ///
    /// Returns the number of evicted clients.
    pub fn evict_idle(&self, max_idle: Duration) -> usize {
        let now = Instant::now();
        let before = self.buckets.len();

        self.buckets
            .retain(|_, bucket| now.duration_since(bucket.last_seen) <= max_idle);

        before.saturating_sub(self.buckets.len())
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.buckets.contains_key(key)
    }
}
