//! Configuration for the response cache

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Entries kept in memory when not configured
pub const DEFAULT_MAX_ENTRIES: usize = 50;

/// Lifetime of an entry written without an explicit TTL
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Environment variable overriding the default cache directory
pub const CACHE_DIR_ENV: &str = "JUST_WEATHER_CACHE_DIR";

/// Configuration for [`ResponseCache`](crate::ResponseCache)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum number of in-memory entries (must be non-zero)
    pub max_entries: usize,

    /// TTL for entries set without one
    pub default_ttl: Duration,

    /// Directory holding one JSON file per entry
    pub directory: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
            default_ttl: DEFAULT_TTL,
            directory: Self::default_directory(),
        }
    }
}

impl CacheConfig {
    /// Config rooted at `directory`
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            ..Default::default()
        }
    }

    pub fn max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    pub fn default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    pub fn directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.directory = directory.into();
        self
    }

    /// `$JUST_WEATHER_CACHE_DIR`, else `<temp dir>/just-weather/cache`
    pub fn default_directory() -> PathBuf {
        env::var_os(CACHE_DIR_ENV)
            .filter(|dir| !dir.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| env::temp_dir().join("just-weather").join("cache"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CacheConfig::default();
        assert_eq!(config.max_entries, 50);
        assert_eq!(config.default_ttl, Duration::from_secs(300));
        assert!(!config.directory.as_os_str().is_empty());
    }

    #[test]
    fn test_builders() {
        let config = CacheConfig::new("/var/cache/jw")
            .max_entries(2)
            .default_ttl(Duration::from_secs(1));
        assert_eq!(config.directory, PathBuf::from("/var/cache/jw"));
        assert_eq!(config.max_entries, 2);
        assert_eq!(config.default_ttl, Duration::from_secs(1));
    }
}
