//! Request target parsed from an `http://` URL

use http::Uri;

use just_weather_core::{Error, Result};

const DEFAULT_PORT: u16 = 80;

/// Host, port and origin-form path of a plain-HTTP URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub host: String,
    pub port: u16,
    /// Path plus query, always starting with `/`
    pub path: String,
}

impl Target {
    /// Parse `url`; only the `http` scheme is accepted
    pub fn parse(url: &str) -> Result<Self> {
        let uri: Uri = url
            .parse()
            .map_err(|e| Error::invalid_argument(format!("invalid URL {url:?}: {e}")))?;

        match uri.scheme_str() {
            Some(scheme) if scheme.eq_ignore_ascii_case("http") => {}
            Some(scheme) => {
                return Err(Error::invalid_argument(format!(
                    "unsupported scheme {scheme:?}: only http is supported"
                )));
            }
            None => {
                return Err(Error::invalid_argument(format!("URL {url:?} has no scheme")));
            }
        }

        // IPv6 literals come back bracketed
        let host = uri
            .host()
            .map(|h| h.trim_start_matches('[').trim_end_matches(']'))
            .filter(|h| !h.is_empty())
            .ok_or_else(|| Error::invalid_argument(format!("URL {url:?} has no host")))?
            .to_string();

        let port = uri.port_u16().unwrap_or(DEFAULT_PORT);
        if port == 0 {
            return Err(Error::invalid_argument(format!("URL {url:?} has port 0")));
        }

        let path = match uri.path_and_query().map(|pq| pq.as_str()) {
            Some(p) if p.starts_with('/') => p.to_string(),
            Some(p) if !p.is_empty() => format!("/{p}"),
            _ => "/".to_string(),
        };

        Ok(Self { host, port, path })
    }

    /// Value for the `Host` header
    pub fn host_header(&self) -> String {
        let host = if self.host.contains(':') {
            format!("[{}]", self.host)
        } else {
            self.host.clone()
        };
        if self.port == DEFAULT_PORT {
            host
        } else {
            format!("{host}:{}", self.port)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use just_weather_core::ErrorKind;

    #[test]
    fn test_parse_full_url() {
        let target = Target::parse("http://localhost:10680/v1/weather?city=Stockholm").unwrap();
        assert_eq!(target.host, "localhost");
        assert_eq!(target.port, 10680);
        assert_eq!(target.path, "/v1/weather?city=Stockholm");
        assert_eq!(target.host_header(), "localhost:10680");
    }

    #[test]
    fn test_default_port_and_path() {
        let target = Target::parse("http://example.com").unwrap();
        assert_eq!(target.port, 80);
        assert_eq!(target.path, "/");
        assert_eq!(target.host_header(), "example.com");
    }

    #[test]
    fn test_ipv6_literal() {
        let target = Target::parse("http://[::1]:8080/echo").unwrap();
        assert_eq!(target.host, "::1");
        assert_eq!(target.port, 8080);
        assert_eq!(target.host_header(), "[::1]:8080");
    }

    #[test]
    fn test_rejects_non_http() {
        for url in [
            "https://example.com/",
            "ftp://example.com/",
            "example.com/path",
            "not a url",
            "http://host:0/",
        ] {
            let err = Target::parse(url).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidArgument, "{url}");
        }
    }
}
