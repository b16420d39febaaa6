//! HTTP/1.1 request encoding

use crate::Target;

/// Encode a `GET` request head for `target`
///
/// Every request asks the server to close the connection afterwards; there
/// is no connection reuse.
pub fn encode_get(target: &Target, user_agent: &str) -> Vec<u8> {
    format!(
        "GET {path} HTTP/1.1\r\n\
         Host: {host}\r\n\
         User-Agent: {user_agent}\r\n\
         Accept: */*\r\n\
         Connection: close\r\n\
         \r\n",
        path = target.path,
        host = target.host_header(),
    )
    .into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_get() {
        let target = Target::parse("http://localhost:10680/v1/cities?query=stock").unwrap();
        let request = String::from_utf8(encode_get(&target, "just-weather/test")).unwrap();

        assert_eq!(
            request,
            "GET /v1/cities?query=stock HTTP/1.1\r\n\
             Host: localhost:10680\r\n\
             User-Agent: just-weather/test\r\n\
             Accept: */*\r\n\
             Connection: close\r\n\r\n"
        );
    }
}
