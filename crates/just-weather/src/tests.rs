//! Integration tests for WeatherClient against a loopback server

#[cfg(test)]
mod tests {
    use crate::prelude::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::sync::{Arc, Mutex};
    use std::thread::{self, JoinHandle};
    use std::time::Duration;
    use tempfile::TempDir;

    /// Serves `responses` in order, one per connection, recording request lines
    struct TestServer {
        port: u16,
        requests: Arc<Mutex<Vec<String>>>,
        handle: Option<JoinHandle<()>>,
    }

    impl TestServer {
        fn start(responses: Vec<String>) -> Self {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            let port = listener.local_addr().unwrap().port();
            let requests = Arc::new(Mutex::new(Vec::new()));
            let log = Arc::clone(&requests);

            let handle = thread::spawn(move || {
                for response in responses {
                    let (mut socket, _) = listener.accept().unwrap();
                    let mut head = Vec::new();
                    let mut byte = [0u8; 1];
                    while !head.ends_with(b"\r\n\r\n") {
                        if socket.read(&mut byte).unwrap() == 0 {
                            break;
                        }
                        head.push(byte[0]);
                    }
                    let head = String::from_utf8(head).unwrap();
                    let line = head.lines().next().unwrap_or_default().to_string();
                    log.lock().unwrap().push(line);
                    socket.write_all(response.as_bytes()).unwrap();
                }
            });

            Self {
                port,
                requests,
                handle: Some(handle),
            }
        }

        fn requests(&mut self) -> Vec<String> {
            if let Some(handle) = self.handle.take() {
                handle.join().unwrap();
            }
            self.requests.lock().unwrap().clone()
        }
    }

    fn json_response(status: &str, extra_headers: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\n{extra_headers}\
             Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        )
    }

    fn ok(body: &str) -> String {
        json_response("200 OK", "", body)
    }

    fn client(server: &TestServer, dir: &TempDir) -> WeatherClient {
        let config = WeatherClientConfig::new("127.0.0.1", server.port)
            .timeout(Duration::from_secs(2))
            .cache(CacheConfig::new(dir.path()));
        WeatherClient::new(config)
    }

    const STOCKHOLM: &str = r#"{"success":true,"data":{"city":"Stockholm","temperature":4.5}}"#;

    #[test]
    fn test_weather_by_city_is_cached() {
        let dir = tempfile::tempdir().unwrap();
        let mut server = TestServer::start(vec![ok(STOCKHOLM)]);
        let mut client = client(&server, &dir);

        let first = client.weather_by_city("Stockholm", None, None).unwrap();
        assert_eq!(first["data"]["city"], "Stockholm");

        // Different spelling, same normalized key; no second request
        let second = client.weather_by_city("  STOCKHOLM ", None, None).unwrap();
        assert_eq!(first, second);

        assert_eq!(
            server.requests(),
            vec!["GET /v1/weather?city=Stockholm HTTP/1.1"]
        );
        let stats = client.cache_stats().unwrap();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.writes, 1);
    }

    #[test]
    fn test_cache_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let mut server = TestServer::start(vec![ok(r#"{"success":true,"cities":["Stockholm"]}"#)]);

        let mut client_a = client(&server, &dir);
        client_a.search_cities("Stock").unwrap();
        drop(client_a);

        let mut client_b = client(&server, &dir);
        let cached = client_b.search_cities("stock").unwrap();
        assert_eq!(cached["cities"][0], "Stockholm");
        assert_eq!(server.requests().len(), 1);
        assert_eq!(client_b.cache_stats().unwrap().disk_hits, 1);
    }

    #[test]
    fn test_api_error_is_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        let failure = r#"{"success":false,"error":{"code":404,"message":"City not found"}}"#;
        let mut server = TestServer::start(vec![
            json_response("404 Not Found", "", failure),
            json_response("404 Not Found", "", failure),
        ]);
        let mut client = client(&server, &dir);

        for _ in 0..2 {
            match client.weather_by_city("Atlantis", None, None) {
                Err(WeatherError::Api(msg)) => assert_eq!(msg, "City not found"),
                other => panic!("expected API error, got {other:?}"),
            }
        }
        assert_eq!(server.requests().len(), 2);
        assert_eq!(client.cache_stats().unwrap().writes, 0);
    }

    #[test]
    fn test_no_store_is_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        let body = r#"{"success":true,"version":"1.0"}"#;
        let mut server = TestServer::start(vec![
            json_response("200 OK", "Cache-Control: no-store\r\n", body),
            json_response("200 OK", "Cache-Control: no-store\r\n", body),
        ]);
        let mut client = client(&server, &dir);

        client.homepage().unwrap();
        client.homepage().unwrap();
        assert_eq!(server.requests(), vec!["GET / HTTP/1.1", "GET / HTTP/1.1"]);
    }

    #[test]
    fn test_current_uses_fixed_precision() {
        let dir = tempfile::tempdir().unwrap();
        let mut server = TestServer::start(vec![ok(r#"{"success":true}"#)]);
        let mut client = client(&server, &dir);

        client.current(59.33, 18.07).unwrap();
        assert_eq!(
            server.requests(),
            vec!["GET /v1/current?lat=59.3300&lon=18.0700 HTTP/1.1"]
        );
    }

    #[test]
    fn test_invalid_input_makes_no_request() {
        let dir = tempfile::tempdir().unwrap();
        let mut server = TestServer::start(Vec::new());
        let mut client = client(&server, &dir);

        assert!(matches!(
            client.current(91.0, 0.0),
            Err(WeatherError::InvalidInput(_))
        ));
        assert!(matches!(
            client.weather_by_city("   ", None, None),
            Err(WeatherError::InvalidInput(_))
        ));
        assert!(matches!(
            client.search_cities("S"),
            Err(WeatherError::InvalidInput(_))
        ));
        assert!(server.requests().is_empty());
    }

    #[test]
    fn test_echo_wraps_body() {
        let dir = tempfile::tempdir().unwrap();
        let mut server = TestServer::start(vec![
            "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\n\r\nGET /echo HTTP/1.1".to_string(),
            "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\n\r\nsecond".to_string(),
        ]);
        let mut client = client(&server, &dir);

        let echoed = client.echo().unwrap();
        assert_eq!(echoed, serde_json::json!({ "echo": "GET /echo HTTP/1.1" }));
        // Never cached
        assert_eq!(client.echo().unwrap()["echo"], "second");
        assert_eq!(server.requests().len(), 2);
    }

    #[test]
    fn test_bad_bodies() {
        let dir = tempfile::tempdir().unwrap();
        let mut server = TestServer::start(vec![
            "HTTP/1.1 200 OK\r\nContent-Length: 0\r\n\r\n".to_string(),
            json_response("200 OK", "", "<html>oops</html>"),
            json_response("502 Bad Gateway", "", r#"{"detail":"upstream"}"#),
        ]);
        let mut client = client(&server, &dir);

        assert!(matches!(client.homepage(), Err(WeatherError::EmptyResponse)));
        assert!(matches!(client.homepage(), Err(WeatherError::Json(_))));
        assert!(matches!(client.homepage(), Err(WeatherError::Status(502))));
        server.requests();
    }

    #[test]
    fn test_clear_cache_forces_refetch() {
        let dir = tempfile::tempdir().unwrap();
        let mut server = TestServer::start(vec![ok(STOCKHOLM), ok(STOCKHOLM)]);
        let mut client = client(&server, &dir);

        client.weather_by_city("Stockholm", None, None).unwrap();
        client.clear_cache();
        client.weather_by_city("Stockholm", None, None).unwrap();
        assert_eq!(server.requests().len(), 2);
    }

    #[test]
    fn test_cache_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let mut server = TestServer::start(vec![ok(STOCKHOLM), ok(STOCKHOLM)]);
        let config = WeatherClientConfig::new("127.0.0.1", server.port)
            .cache(CacheConfig::new(dir.path()))
            .use_cache(false);
        let mut client = WeatherClient::new(config);

        client.weather_by_city("Stockholm", None, None).unwrap();
        client.weather_by_city("Stockholm", None, None).unwrap();
        assert_eq!(server.requests().len(), 2);
        assert!(client.cache_stats().is_none());
    }

    #[test]
    fn test_server_down_is_network_error() {
        let dir = tempfile::tempdir().unwrap();
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let config = WeatherClientConfig::new("127.0.0.1", port)
            .timeout(Duration::from_secs(1))
            .cache(CacheConfig::new(dir.path()));
        let mut client = WeatherClient::new(config);

        let err = client.homepage().unwrap_err();
        assert!(matches!(err, WeatherError::Net(_)));
        assert_eq!(err.exit_code(), crate::EXIT_NETWORK_ERROR);
    }
}
