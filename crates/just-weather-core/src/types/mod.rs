//! Core types for cache operations

mod entry;
mod stats;

pub use entry::CacheEntry;
pub use stats::CacheStats;
