//! just-weather-net: TCP transport and HTTP/1.1 GET client
//!
//! - [`Transport`]: one socket with connect/receive timeouts and reliable send
//! - [`HttpClient`]: `GET` over a fresh connection per request, with
//!   `Content-Length`, chunked and close-delimited body framing
//! - [`CacheControl`] / [`HttpCachePolicy`]: decide whether a response may be
//!   cached and for how long

pub mod cache_control;
pub mod client;
pub mod codec;
pub mod policy;
pub mod request;
pub mod response;
pub mod target;
pub mod transport;

pub use cache_control::CacheControl;
pub use client::{HttpClient, HttpClientConfig};
pub use codec::{DecodeLimits, read_response};
pub use policy::{HttpCachePolicy, is_cacheable};
pub use request::encode_get;
pub use response::HttpResponse;
pub use target::Target;
pub use transport::{Receive, Transport};

pub use just_weather_core::{Error, ErrorKind, Result};
