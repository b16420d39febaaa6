use http::{HeaderMap, StatusCode};
use serde::de::DeserializeOwned;

use just_weather_core::{Error, Result};

use crate::CacheControl;

/// A fully received HTTP response
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: StatusCode, headers: HeaderMap, body: Vec<u8>) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// First value of header `name` if it is visible ASCII
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Decoded body bytes, without transfer framing
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn body_len(&self) -> usize {
        self.body.len()
    }

    /// Body as text, `None` when it is not UTF-8
    pub fn body_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.body).ok()
    }

    pub fn into_body(self) -> Vec<u8> {
        self.body
    }

    /// Deserialize the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body)
            .map_err(|e| Error::protocol(format!("response body is not valid JSON: {e}")))
    }

    /// Parsed `Cache-Control` directives, default when absent
    pub fn cache_control(&self) -> CacheControl {
        CacheControl::from_headers(&self.headers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;
    use http::header::{CACHE_CONTROL, CONTENT_TYPE};
    use serde::Deserialize;
    use std::time::Duration;

    fn response(body: &[u8]) -> HttpResponse {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("public, max-age=120"));
        HttpResponse::new(StatusCode::OK, headers, body.to_vec())
    }

    #[test]
    fn test_accessors() {
        let r = response(br#"{"ok":true}"#);
        assert_eq!(r.status_code(), 200);
        assert!(r.is_success());
        assert_eq!(r.body_len(), 11);
        assert_eq!(r.body_str(), Some(r#"{"ok":true}"#));
        assert_eq!(r.header("Content-Type"), Some("application/json"));
        assert_eq!(r.header("x-missing"), None);
    }

    #[test]
    fn test_json_body() {
        #[derive(Deserialize)]
        struct Payload {
            ok: bool,
        }

        let r = response(br#"{"ok":true}"#);
        let payload: Payload = r.json().unwrap();
        assert!(payload.ok);

        let r = response(b"<html>");
        assert!(r.json::<Payload>().is_err());
    }

    #[test]
    fn test_non_utf8_body() {
        let r = response(&[0xff, 0xfe]);
        assert!(r.body_str().is_none());
        assert_eq!(r.into_body(), vec![0xff, 0xfe]);
    }

    #[test]
    fn test_cache_control() {
        let cc = response(b"{}").cache_control();
        assert!(!cc.no_store);
        assert_eq!(cc.max_age, Some(Duration::from_secs(120)));
    }
}
