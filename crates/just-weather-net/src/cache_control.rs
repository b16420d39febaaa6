use std::time::Duration;

use http::HeaderMap;
use http::header::CACHE_CONTROL;

/// Directives from a response `Cache-Control` header
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheControl {
    pub max_age: Option<Duration>,
    pub no_cache: bool,
    pub no_store: bool,
    pub private: bool,
}

impl CacheControl {
    /// Parse a header value. Unknown directives and bad numbers are skipped.
    pub fn parse(header: &str) -> Self {
        let mut cc = Self::default();
        for directive in header.split(',').map(str::trim) {
            let (name, value) = match directive.split_once('=') {
                Some((name, value)) => (name.trim(), Some(value.trim().trim_matches('"'))),
                None => (directive, None),
            };

            match name.to_ascii_lowercase().as_str() {
                "no-cache" => cc.no_cache = true,
                "no-store" => cc.no_store = true,
                "private" => cc.private = true,
                "max-age" => {
                    if let Some(secs) = value.and_then(|v| v.parse::<u64>().ok()) {
                        cc.max_age = Some(Duration::from_secs(secs));
                    }
                }
                _ => {}
            }
        }
        cc
    }

    /// Merge every `Cache-Control` field in `headers`
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let joined = headers
            .get_all(CACHE_CONTROL)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect::<Vec<_>>()
            .join(",");
        Self::parse(&joined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    #[test]
    fn test_parse_directives() {
        let cc = CacheControl::parse("Private, MAX-AGE=300, must-revalidate");
        assert!(cc.private);
        assert!(!cc.no_cache);
        assert!(!cc.no_store);
        assert_eq!(cc.max_age, Some(Duration::from_secs(300)));
    }

    #[test]
    fn test_parse_ignores_garbage() {
        let cc = CacheControl::parse("max-age=soon, x-custom=1, , no-store");
        assert_eq!(cc.max_age, None);
        assert!(cc.no_store);
    }

    #[test]
    fn test_from_multiple_headers() {
        let mut headers = HeaderMap::new();
        headers.append(CACHE_CONTROL, HeaderValue::from_static("private"));
        headers.append(CACHE_CONTROL, HeaderValue::from_static("max-age=\"60\""));
        let cc = CacheControl::from_headers(&headers);
        assert!(cc.private);
        assert_eq!(cc.max_age, Some(Duration::from_secs(60)));

        assert_eq!(CacheControl::from_headers(&HeaderMap::new()), CacheControl::default());
    }
}
