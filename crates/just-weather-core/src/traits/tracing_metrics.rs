use crate::{CacheMetrics, CacheTier, EvictionReason};
use tracing::{debug, trace, warn};

/// Metrics adapter that logs events via `tracing`
#[derive(Debug, Clone, Default)]
pub struct TracingMetrics {
    /// Service name/prefix (optional)
    service_name: Option<String>,
}

impl TracingMetrics {
    /// Create new tracing metrics adapter
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with service name prefix
    pub fn with_service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = Some(name.into());
        self
    }
}

impl CacheMetrics for TracingMetrics {
    fn record_hit(&self, key: &str, tier: CacheTier) {
        debug!(
            target: "just_weather::cache",
            event = "hit",
            key = %key,
            tier = tier.as_str(),
            service = ?self.service_name,
            "Cache Hit"
        );
    }

    fn record_miss(&self, key: &str) {
        debug!(
            target: "just_weather::cache",
            event = "miss",
            key = %key,
            service = ?self.service_name,
            "Cache Miss"
        );
    }

    fn record_eviction(&self, reason: EvictionReason) {
        debug!(
            target: "just_weather::cache",
            event = "eviction",
            reason = reason.as_str(),
            service = ?self.service_name,
            "Cache Eviction"
        );
    }

    fn record_disk_error(&self, key: &str) {
        warn!(
            target: "just_weather::cache",
            event = "disk_error",
            key = %key,
            service = ?self.service_name,
            "Cache Disk Error"
        );
    }

    fn record_size(&self, size: usize) {
        trace!(
            target: "just_weather::cache",
            event = "size",
            size = size,
            service = ?self.service_name,
            "Cache Size Update"
        );
    }
}
