//! The response cache

use std::path::Path;
use std::time::Duration;

use tracing::{debug, trace, warn};

use just_weather_core::{
    CacheEntry, CacheMetrics, CacheStats, CacheTier, Clock, Error, EvictionReason, NoopMetrics,
    Result, SystemClock,
};

use crate::config::CacheConfig;
use crate::disk::DiskStore;
use crate::recency::RecencyIndex;

/// Bounded key/value cache with disk persistence and TTL expiry
///
/// * At most `max_entries` entries live in memory. When a new key needs room,
///   expired entries go first, then the entry written longest ago. Reads do
///   not refresh an entry's position.
/// * Every write is mirrored to `<directory>/<sha256(key)>.json`. A lookup
///   that misses in memory falls back to that file, so a fresh cache over the
///   same directory warms from disk.
/// * An entry is fresh while `now - timestamp <= ttl`.
///
/// Lookups never fail: a missing, expired or unreadable entry is a miss.
#[derive(Debug)]
pub struct ResponseCache<C: Clock = SystemClock, M: CacheMetrics = NoopMetrics> {
    config: CacheConfig,
    index: RecencyIndex,
    disk: DiskStore,
    clock: C,
    metrics: M,
    stats: CacheStats,
}

impl ResponseCache {
    /// Open a cache using the system clock and no metrics
    pub fn new(config: CacheConfig) -> Result<Self> {
        Self::with_clock_and_metrics(config, SystemClock, NoopMetrics)
    }
}

impl<C: Clock, M: CacheMetrics> ResponseCache<C, M> {
    /// Open a cache with a custom time source and metrics sink
    ///
    /// Creates the directory if it does not exist.
    pub fn with_clock_and_metrics(config: CacheConfig, clock: C, metrics: M) -> Result<Self> {
        if config.max_entries == 0 {
            return Err(Error::invalid_argument("max_entries must be at least 1"));
        }
        let disk = DiskStore::open(&config.directory)?;
        debug!(
            dir = %config.directory.display(),
            max_entries = config.max_entries,
            default_ttl_secs = config.default_ttl.as_secs(),
            "cache opened"
        );

        Ok(Self {
            index: RecencyIndex::with_capacity(config.max_entries),
            config,
            disk,
            clock,
            metrics,
            stats: CacheStats::default(),
        })
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn directory(&self) -> &Path {
        self.disk.root()
    }

    /// Number of entries in memory, expired ones included
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.len() == 0
    }

    /// Whether a fresh entry for `key` is in memory. Does not count as a lookup.
    pub fn contains(&self, key: &str) -> bool {
        let now = self.clock.now_ms();
        self.index
            .get(key)
            .is_some_and(|e| !e.is_expired(now, self.config.default_ttl))
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            size: self.index.len(),
            ..self.stats.clone()
        }
    }

    /// Store `value` under `key` with the default TTL
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.store(CacheEntry::new(
            key,
            value,
            self.clock.now_ms(),
            Some(self.config.default_ttl),
        ))
    }

    /// Store `value` under `key`, expiring `ttl` from now
    pub fn set_with_ttl(&mut self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        self.store(CacheEntry::new(key, value, self.clock.now_ms(), Some(ttl)))
    }

    /// The memory update always happens; a failed disk write is reported
    /// afterwards as an `Io` error.
    fn store(&mut self, entry: CacheEntry) -> Result<()> {
        if entry.key.is_empty() {
            return Err(Error::invalid_argument("cache key must not be empty"));
        }

        let persisted = self.disk.write(&entry);
        let key = entry.key.clone();

        match self.index.update(entry) {
            Ok(()) => {
                trace!(%key, "entry replaced");
                self.metrics.record_eviction(EvictionReason::Replaced);
            }
            Err(entry) => {
                self.make_room();
                self.index.push(entry);
                trace!(%key, "entry inserted");
            }
        }
        self.stats.writes += 1;
        self.metrics.record_size(self.index.len());

        if let Err(err) = &persisted {
            warn!(%key, error = %err, "cache entry kept in memory only");
            self.stats.disk_errors += 1;
            self.metrics.record_disk_error(&key);
        }
        persisted
    }

    /// Look up `key`, falling back to its file on a memory miss
    pub fn get(&mut self, key: &str) -> Option<String> {
        let now = self.clock.now_ms();
        let default_ttl = self.config.default_ttl;

        if let Some(entry) = self.index.get(key) {
            if entry.is_expired(now, default_ttl) {
                trace!(key, age_ms = entry.age(now).as_millis() as u64, "entry expired");
                self.record_miss(key);
                return None;
            }
            let value = entry.value.clone();
            self.stats.hits += 1;
            self.stats.memory_hits += 1;
            self.metrics.record_hit(key, CacheTier::Memory);
            return Some(value);
        }

        match self.disk.read(key) {
            Some(entry) if !entry.is_expired(now, default_ttl) => {
                let value = entry.value.clone();
                self.make_room();
                self.index.push(entry);
                self.stats.hits += 1;
                self.stats.disk_hits += 1;
                self.metrics.record_hit(key, CacheTier::Disk);
                self.metrics.record_size(self.index.len());
                debug!(key, "entry loaded from disk");
                Some(value)
            }
            Some(_) => {
                trace!(key, "disk entry expired");
                self.record_miss(key);
                None
            }
            None => {
                self.record_miss(key);
                None
            }
        }
    }

    /// Drop `key` from memory and disk. Returns whether anything was cached.
    pub fn remove(&mut self, key: &str) -> Result<bool> {
        let in_memory = self.index.remove(key).is_some();
        let on_disk = self.disk.path_for(key).exists();
        self.disk.remove(key)?;
        if in_memory {
            self.metrics.record_size(self.index.len());
        }
        Ok(in_memory || on_disk)
    }

    /// Remove every entry from memory and every entry file from the directory
    ///
    /// Best effort: files that cannot be deleted are logged and counted as
    /// disk errors.
    pub fn clear(&mut self) {
        let dropped = self.index.len();
        self.index.clear();
        let failures = self.disk.clear();

        for _ in 0..dropped {
            self.metrics.record_eviction(EvictionReason::Cleared);
        }
        self.stats.evictions += dropped as u64;
        self.stats.disk_errors += failures as u64;
        self.metrics.record_size(0);
        debug!(dropped, failures, "cache cleared");
    }

    /// Drop expired in-memory entries and delete their files
    pub fn purge_expired(&mut self) -> usize {
        let now = self.clock.now_ms();
        let default_ttl = self.config.default_ttl;
        let expired = self
            .index
            .remove_where(|e| e.is_expired(now, default_ttl));

        for entry in &expired {
            self.forget_file(&entry.key);
            self.stats.evictions += 1;
            self.metrics.record_eviction(EvictionReason::Expired);
        }
        if !expired.is_empty() {
            self.metrics.record_size(self.index.len());
            debug!(count = expired.len(), "purged expired entries");
        }
        expired.len()
    }

    /// Ensure there is space for one more in-memory entry
    fn make_room(&mut self) {
        if self.index.len() < self.config.max_entries {
            return;
        }
        self.purge_expired();

        while self.index.len() >= self.config.max_entries {
            let Some(oldest) = self.index.pop_oldest() else {
                break;
            };
            debug!(key = %oldest.key, "evicting oldest entry");
            // The file goes too, or a later lookup would reload it
            self.forget_file(&oldest.key);
            self.stats.evictions += 1;
            self.metrics.record_eviction(EvictionReason::Capacity);
        }
    }

    fn forget_file(&mut self, key: &str) {
        if let Err(err) = self.disk.remove(key) {
            warn!(key, error = %err, "failed to delete cache file");
            self.stats.disk_errors += 1;
            self.metrics.record_disk_error(key);
        }
    }

    fn record_miss(&mut self, key: &str) {
        self.stats.misses += 1;
        self.metrics.record_miss(key);
    }
}
