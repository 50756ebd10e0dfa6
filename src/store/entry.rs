// Cache entry wrapper.
// Pairs a cached value with its write time and answers the TTL validity check.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Wrapper for cached data with the instant it was written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    /// The cached value.
    pub data: T,
    /// When the value was written.
    pub cached_at: DateTime<Utc>,
}

impl<T> CacheEntry<T> {
    /// Create an entry stamped with the current time.
    pub fn new(data: T) -> Self {
        Self {
            data,
            cached_at: Utc::now(),
        }
    }

    /// Age of this entry. An entry stamped in the future reads as maximally
    /// old so a skewed clock forces a refetch rather than pinning stale data.
    pub fn age(&self) -> Duration {
        Utc::now()
            .signed_duration_since(self.cached_at)
            .to_std()
            .unwrap_or(Duration::MAX)
    }

    /// An entry is valid iff strictly younger than the TTL. An entry whose
    /// age equals the TTL exactly is already expired. `None` is unlimited.
    pub fn is_valid(&self, ttl: Option<Duration>) -> bool {
        match ttl {
            Some(ttl) => self.age() < ttl,
            None => true,
        }
    }

    /// Check if this entry has outlived the TTL.
    pub fn is_expired(&self, ttl: Option<Duration>) -> bool {
        !self.is_valid(ttl)
    }
}
