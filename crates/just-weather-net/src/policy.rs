use std::time::Duration;

use http::StatusCode;

use crate::CacheControl;

/// How upstream `Cache-Control` affects what the client stores
#[derive(Debug, Clone, Default)]
pub struct HttpCachePolicy {
    /// TTL when the response carries no `max-age`
    pub default_ttl: Option<Duration>,
}

impl HttpCachePolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = Some(ttl);
        self
    }

    /// TTL to store a response with, `None` when it must not be reused
    ///
    /// `no-store`, `no-cache` and `max-age=0` all disable reuse. Otherwise
    /// `max-age` wins over the default.
    pub fn effective_ttl(&self, cc: &CacheControl) -> Option<Duration> {
        if cc.no_store || cc.no_cache {
            return None;
        }
        match cc.max_age {
            Some(ttl) if ttl.is_zero() => None,
            Some(ttl) => Some(ttl),
            None => self.default_ttl,
        }
    }
}

/// Whether a response may be written to the cache at all
///
/// Only `200 OK` bodies are stored. `private` is allowed since this is a
/// single-user cache.
pub fn is_cacheable(status: StatusCode, cc: &CacheControl) -> bool {
    status == StatusCode::OK && !cc.no_store
}
