//! Blocking HTTP/1.1 GET client

use std::time::Duration;

use tracing::{debug, warn};

use just_weather_core::{Error, Result};

use crate::codec::{DecodeLimits, read_response};
use crate::request::encode_get;
use crate::{HttpResponse, Target, Transport};

/// Settings for [`HttpClient`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpClientConfig {
    /// Bound on connect and on each individual receive
    pub timeout: Duration,
    /// Ceiling on the total bytes read for one response
    pub max_response_size: usize,
    /// Ceiling on the status line plus headers
    pub max_header_bytes: usize,
    /// Sent as `User-Agent`
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(5000),
            max_response_size: 8 * 1024 * 1024,
            max_header_bytes: 64 * 1024,
            user_agent: concat!("just-weather/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl HttpClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout_ms(self, ms: u64) -> Self {
        self.timeout(Duration::from_millis(ms))
    }

    pub fn max_response_size(mut self, bytes: usize) -> Self {
        self.max_response_size = bytes;
        self
    }

    pub fn max_header_bytes(mut self, bytes: usize) -> Self {
        self.max_header_bytes = bytes;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    /// Decoder bounds matching this configuration
    pub fn decode_limits(&self) -> DecodeLimits {
        DecodeLimits {
            timeout: self.timeout,
            max_response_size: self.max_response_size,
            max_header_bytes: self.max_header_bytes,
        }
    }
}

/// HTTP client that opens a fresh connection for every request
///
/// The last successful response is kept until the next call to
/// [`get`](Self::get). A failed request leaves no response behind.
#[derive(Debug, Default)]
pub struct HttpClient {
    transport: Transport,
    config: HttpClientConfig,
    last: Option<HttpResponse>,
}

impl HttpClient {
    pub fn new(config: HttpClientConfig) -> Self {
        Self {
            transport: Transport::new(),
            config,
            last: None,
        }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self::new(HttpClientConfig::default().timeout(timeout))
    }

    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    pub fn set_timeout(&mut self, timeout: Duration) {
        self.config.timeout = timeout;
    }

    /// GET `url` using the configured timeout
    pub fn get(&mut self, url: &str) -> Result<&HttpResponse> {
        self.get_with_timeout(url, self.config.timeout)
    }

    /// GET `url`, bounding connect and each receive by `timeout`
    pub fn get_with_timeout(&mut self, url: &str, timeout: Duration) -> Result<&HttpResponse> {
        let target = Target::parse(url)?;
        self.last = None;

        let outcome = self.exchange(&target, timeout);
        self.transport.close();

        match outcome {
            Ok(response) => {
                debug!(
                    url,
                    status = response.status_code(),
                    bytes = response.body_len(),
                    "request complete"
                );
                Ok(&*self.last.insert(response))
            }
            Err(err) => {
                warn!(url, error = %err, "request failed");
                Err(err)
            }
        }
    }

    fn exchange(&mut self, target: &Target, timeout: Duration) -> Result<HttpResponse> {
        self.transport.connect(&target.host, target.port, timeout)?;
        self.transport
            .send(&encode_get(target, &self.config.user_agent))?;
        let limits = DecodeLimits {
            timeout,
            ..self.config.decode_limits()
        };
        read_response(&mut self.transport, &limits)
    }

    pub fn last_response(&self) -> Option<&HttpResponse> {
        self.last.as_ref()
    }

    /// Status of the last successful request
    pub fn status_code(&self) -> Option<u16> {
        self.last.as_ref().map(HttpResponse::status_code)
    }

    /// Body of the last successful request, empty when there is none
    pub fn body(&self) -> &[u8] {
        self.last.as_ref().map(HttpResponse::body).unwrap_or_default()
    }

    pub fn body_len(&self) -> usize {
        self.body().len()
    }

    /// Move the last response out, leaving the client empty
    pub fn take_response(&mut self) -> Result<HttpResponse> {
        self.last
            .take()
            .ok_or_else(|| Error::invalid_argument("no response available"))
    }
}
