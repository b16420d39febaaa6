//! Configuration for the weather client

use std::path::PathBuf;
use std::time::Duration;

use just_weather_cache::CacheConfig;

/// Port the just-weather server listens on by default
pub const DEFAULT_PORT: u16 = 10680;

/// Configuration for [`WeatherClient`](crate::WeatherClient)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherClientConfig {
    /// Server host name or address
    pub host: String,

    /// Server port
    pub port: u16,

    /// Connect and per-receive timeout
    pub timeout: Duration,

    /// Response cache settings
    pub cache: CacheConfig,

    /// Serve from and write to the cache
    pub use_cache: bool,
}

impl Default for WeatherClientConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: DEFAULT_PORT,
            timeout: Duration::from_millis(5000),
            cache: CacheConfig::default(),
            use_cache: true,
        }
    }
}

impl WeatherClientConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn cache(mut self, cache: CacheConfig) -> Self {
        self.cache = cache;
        self
    }

    pub fn cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache.directory = dir.into();
        self
    }

    pub fn use_cache(mut self, enabled: bool) -> Self {
        self.use_cache = enabled;
        self
    }

    /// `http://host:port`, bracketing IPv6 literals
    pub fn base_url(&self) -> String {
        if self.host.contains(':') {
            format!("http://[{}]:{}", self.host, self.port)
        } else {
            format!("http://{}:{}", self.host, self.port)
        }
    }
}
