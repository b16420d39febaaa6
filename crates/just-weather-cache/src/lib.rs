//! just-weather-cache: response cache for just-weather
//!
//! [`ResponseCache`] keeps at most `max_entries` values in memory, ordered by
//! insertion/update time, and mirrors every entry to a JSON file so a new
//! process can warm from disk. Entries expire `ttl` after their last write.
//!
//! # Example
//!
//! ```rust,no_run
//! use just_weather_cache::{CacheConfig, ResponseCache};
//! use std::time::Duration;
//!
//! let config = CacheConfig::default()
//!     .max_entries(100)
//!     .default_ttl(Duration::from_secs(600));
//! let mut cache = ResponseCache::new(config)?;
//!
//! cache.set("weather:city=stockholm:country=:region=", r#"{"success":true}"#)?;
//! assert!(cache.get("weather:city=stockholm:country=:region=").is_some());
//! # Ok::<(), just_weather_cache::Error>(())
//! ```

mod config;
mod disk;
mod engine;
mod recency;

pub use config::{CACHE_DIR_ENV, CacheConfig, DEFAULT_MAX_ENTRIES, DEFAULT_TTL};
pub use disk::{DiskStore, entry_file_name};
pub use engine::ResponseCache;

pub use just_weather_core::{CacheEntry, CacheStats, Error, Result};
