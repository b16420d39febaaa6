//! Cache entry type

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A cached value with the metadata needed to persist and expire it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// The cache key
    pub key: String,
    /// The serialized value
    pub value: String,
    /// When the entry was created or last updated (ms since epoch)
    pub timestamp_ms: u64,
    /// Per-entry time-to-live in milliseconds; `None` uses the cache default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl_ms: Option<u64>,
}

impl CacheEntry {
    /// Create a new cache entry
    pub fn new(
        key: impl Into<String>,
        value: impl Into<String>,
        timestamp_ms: u64,
        ttl: Option<Duration>,
    ) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            timestamp_ms,
            ttl_ms: ttl.map(|t| t.as_millis() as u64),
        }
    }

    /// Effective TTL given the cache's default
    pub fn ttl(&self, default_ttl: Duration) -> Duration {
        self.ttl_ms
            .map(Duration::from_millis)
            .unwrap_or(default_ttl)
    }

    /// Age of the entry at `now_ms`
    pub fn age(&self, now_ms: u64) -> Duration {
        Duration::from_millis(now_ms.saturating_sub(self.timestamp_ms))
    }

    /// An entry is fresh while `now - timestamp <= ttl`
    pub fn is_expired(&self, now_ms: u64, default_ttl: Duration) -> bool {
        self.age(now_ms) > self.ttl(default_ttl)
    }

    /// Approximate size in bytes
    pub fn size(&self) -> usize {
        self.key.len() + self.value.len()
    }
}
