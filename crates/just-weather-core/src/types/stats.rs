//! Cache statistics

/// Statistics for cache operations
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of cache hits (memory + disk)
    pub hits: u64,
    /// Hits served from the in-memory index
    pub memory_hits: u64,
    /// Hits served by loading an entry file
    pub disk_hits: u64,
    /// Number of cache misses, including expired entries
    pub misses: u64,
    /// Number of set operations
    pub writes: u64,
    /// Number of evictions (capacity, expiry, removal)
    pub evictions: u64,
    /// Failed disk writes or deletes
    pub disk_errors: u64,
    /// Current number of in-memory entries
    pub size: usize,
}

impl CacheStats {
    /// Calculate hit ratio (0.0 to 1.0)
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Total lookups (hits + misses)
    pub fn total_requests(&self) -> u64 {
        self.hits + self.misses
    }
}
