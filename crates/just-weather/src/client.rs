//! Weather API client: cache lookup, fetch, validate, store

use std::time::Duration;

use serde_json::{Value, json};
use tracing::{debug, warn};

use just_weather_cache::ResponseCache;
use just_weather_core::{CacheStats, SystemClock, TracingMetrics};
use just_weather_net::{HttpCachePolicy, HttpClient, HttpClientConfig, HttpResponse, is_cacheable};

use crate::config::WeatherClientConfig;
use crate::error::{Result, WeatherError};
use crate::query::Endpoint;

type Cache = ResponseCache<SystemClock, TracingMetrics>;

/// Client for the just-weather HTTP API
///
/// Successful JSON responses are cached under a normalized key for the
/// endpoint's lifetime, or the server's `max-age` when it sends one.
#[derive(Debug)]
pub struct WeatherClient {
    http: HttpClient,
    cache: Option<Cache>,
    config: WeatherClientConfig,
}

impl WeatherClient {
    /// Create a client. A cache directory that cannot be opened disables
    /// caching rather than failing.
    pub fn new(config: WeatherClientConfig) -> Self {
        let http = HttpClient::new(HttpClientConfig::default().timeout(config.timeout));

        let cache = if config.use_cache {
            let metrics = TracingMetrics::new().with_service_name("just-weather");
            match ResponseCache::with_clock_and_metrics(config.cache.clone(), SystemClock, metrics)
            {
                Ok(cache) => Some(cache),
                Err(err) => {
                    warn!(error = %err, "response cache unavailable, continuing without it");
                    None
                }
            }
        } else {
            None
        };

        Self {
            http,
            cache,
            config,
        }
    }

    pub fn config(&self) -> &WeatherClientConfig {
        &self.config
    }

    /// Current conditions at a coordinate
    pub fn current(&mut self, lat: f64, lon: f64) -> Result<Value> {
        self.fetch(&Endpoint::current(lat, lon)?)
    }

    pub fn weather_by_city(
        &mut self,
        city: &str,
        country: Option<&str>,
        region: Option<&str>,
    ) -> Result<Value> {
        self.fetch(&Endpoint::weather(city, country, region)?)
    }

    pub fn search_cities(&mut self, query: &str) -> Result<Value> {
        self.fetch(&Endpoint::cities(query)?)
    }

    pub fn homepage(&mut self) -> Result<Value> {
        self.fetch(&Endpoint::Homepage)
    }

    /// Hit `/echo` and wrap the raw body as `{"echo": "<body>"}`. Never cached.
    pub fn echo(&mut self) -> Result<Value> {
        let response = self.get(&Endpoint::Echo)?;
        if !response.is_success() {
            return Err(WeatherError::Status(response.status_code()));
        }
        let text = String::from_utf8_lossy(response.body());
        Ok(json!({ "echo": text }))
    }

    /// Drop every cached response, in memory and on disk
    pub fn clear_cache(&mut self) {
        if let Some(cache) = self.cache.as_mut() {
            cache.clear();
        }
    }

    pub fn set_timeout(&mut self, timeout: Duration) {
        self.config.timeout = timeout;
        self.http.set_timeout(timeout);
    }

    pub fn cache_stats(&self) -> Option<CacheStats> {
        self.cache.as_ref().map(ResponseCache::stats)
    }

    /// Run `endpoint`, serving from the cache when possible
    pub fn fetch(&mut self, endpoint: &Endpoint) -> Result<Value> {
        let key = endpoint.cache_key();

        if let (Some(cache), Some(key)) = (self.cache.as_mut(), key.as_deref()) {
            if let Some(cached) = cache.get(key) {
                match serde_json::from_str(&cached) {
                    Ok(value) => {
                        debug!(endpoint = endpoint.name(), key, "served from cache");
                        return Ok(value);
                    }
                    Err(err) => warn!(key, error = %err, "cached value is not JSON, refetching"),
                }
            }
        }

        let response = self.get(endpoint)?;
        if response.body().is_empty() {
            return Err(WeatherError::EmptyResponse);
        }

        let value: Value = serde_json::from_slice(response.body())?;
        if value.get("success").and_then(Value::as_bool) == Some(false) {
            let message = value
                .pointer("/error/message")
                .and_then(Value::as_str)
                .unwrap_or("request failed");
            return Err(WeatherError::Api(message.to_string()));
        }
        if !response.is_success() {
            return Err(WeatherError::Status(response.status_code()));
        }

        if let Some(key) = key {
            self.store(endpoint, &key, &response);
        }
        Ok(value)
    }

    fn get(&mut self, endpoint: &Endpoint) -> Result<HttpResponse> {
        let url = format!("{}{}", self.config.base_url(), endpoint.path());
        debug!(endpoint = endpoint.name(), %url, "requesting");
        self.http.get(&url)?;
        Ok(self.http.take_response()?)
    }

    /// Cache a validated response. Failures are logged, never returned.
    fn store(&mut self, endpoint: &Endpoint, key: &str, response: &HttpResponse) {
        let Some(cache) = self.cache.as_mut() else {
            return;
        };

        let cc = response.cache_control();
        if !is_cacheable(response.status(), &cc) {
            debug!(key, "response not cacheable");
            return;
        }
        let Some(ttl) = HttpCachePolicy::new().ttl(endpoint.ttl()).effective_ttl(&cc) else {
            debug!(key, "server disallows reuse");
            return;
        };
        let Some(body) = response.body_str() else {
            return;
        };

        if let Err(err) = cache.set_with_ttl(key, body, ttl) {
            warn!(key, error = %err, "failed to cache response");
        }
    }
}
