//! Core traits for cache and transport collaborators

mod cache_metrics;
mod clock;
mod key;
mod tracing_metrics;

pub use cache_metrics::{CacheMetrics, CacheTier, EvictionReason, NoopMetrics};
pub use clock::{Clock, ManualClock, SystemClock};
pub use key::{CacheKey, normalize_for_cache};
pub use tracing_metrics::TracingMetrics;

#[cfg(feature = "metrics")]
pub use cache_metrics::MetricsCrateAdapter;
