//! Metrics trait for cache observability

/// Where a cache hit was served from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheTier {
    /// In-memory recency index
    Memory,
    /// Entry file on disk
    Disk,
}

impl CacheTier {
    /// Get tier as string label
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheTier::Memory => "memory",
            CacheTier::Disk => "disk",
        }
    }
}

/// Reason for cache eviction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EvictionReason {
    /// TTL expired
    Expired,
    /// Capacity limit reached
    Capacity,
    /// Explicitly removed or cleared
    Cleared,
    /// Replaced by new value under the same key
    Replaced,
}

impl EvictionReason {
    /// Get reason as string label
    pub fn as_str(&self) -> &'static str {
        match self {
            EvictionReason::Expired => "expired",
            EvictionReason::Capacity => "capacity",
            EvictionReason::Cleared => "cleared",
            EvictionReason::Replaced => "replaced",
        }
    }
}

/// Trait for cache metrics/observability
///
/// Implement this to integrate with your metrics system (Prometheus, StatsD, etc.)
pub trait CacheMetrics: Send + Sync + 'static {
    /// Record a cache hit
    fn record_hit(&self, key: &str, tier: CacheTier);

    /// Record a cache miss (absent, expired or unreadable)
    fn record_miss(&self, key: &str);

    /// Record an eviction
    fn record_eviction(&self, reason: EvictionReason);

    /// Record a failed disk write or delete
    fn record_disk_error(&self, key: &str);

    /// Record the number of in-memory entries
    fn record_size(&self, size: usize);
}

/// No-op metrics implementation (default)
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMetrics;

impl CacheMetrics for NoopMetrics {
    #[inline]
    fn record_hit(&self, _key: &str, _tier: CacheTier) {}

    #[inline]
    fn record_miss(&self, _key: &str) {}

    #[inline]
    fn record_eviction(&self, _reason: EvictionReason) {}

    #[inline]
    fn record_disk_error(&self, _key: &str) {}

    #[inline]
    fn record_size(&self, _size: usize) {}
}

/// Metrics adapter using the `metrics` crate
///
/// # Example
/// ```ignore
/// use just_weather_core::MetricsCrateAdapter;
///
/// // Set up a metrics recorder first (e.g. a Prometheus exporter)
/// let metrics = MetricsCrateAdapter::new("just_weather_cache");
/// // Emits: just_weather_cache_hits_total, just_weather_cache_misses_total, ...
/// ```
#[cfg(feature = "metrics")]
#[derive(Debug, Clone)]
pub struct MetricsCrateAdapter {
    prefix: String,
}

#[cfg(feature = "metrics")]
impl MetricsCrateAdapter {
    /// Create a new adapter with the given metric name prefix
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    fn metric_name(&self, name: &str) -> String {
        format!("{}_{}", self.prefix, name)
    }
}

#[cfg(feature = "metrics")]
impl CacheMetrics for MetricsCrateAdapter {
    fn record_hit(&self, _key: &str, tier: CacheTier) {
        metrics::counter!(self.metric_name("hits_total"), "tier" => tier.as_str()).increment(1);
    }

    fn record_miss(&self, _key: &str) {
        metrics::counter!(self.metric_name("misses_total")).increment(1);
    }

    fn record_eviction(&self, reason: EvictionReason) {
        metrics::counter!(
            self.metric_name("evictions_total"),
            "reason" => reason.as_str()
        )
        .increment(1);
    }

    fn record_disk_error(&self, _key: &str) {
        metrics::counter!(self.metric_name("disk_errors_total")).increment(1);
    }

    fn record_size(&self, size: usize) {
        metrics::gauge!(self.metric_name("entries")).set(size as f64);
    }
}
