//! Errors surfaced by the weather client

use just_weather_core::ErrorKind;
use thiserror::Error;

/// Exit status for bad command-line input
pub const EXIT_INVALID_ARGS: i32 = 1;
/// Exit status when the server could not be reached
pub const EXIT_NETWORK_ERROR: i32 = 2;
/// Exit status when the server answered with an error or garbage
pub const EXIT_SERVER_ERROR: i32 = 3;

/// Error type for [`WeatherClient`](crate::WeatherClient) operations
#[derive(Error, Debug)]
pub enum WeatherError {
    /// Transport, HTTP or cache failure
    #[error(transparent)]
    Net(#[from] just_weather_core::Error),

    /// Rejected before any request was made
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Body was not valid JSON
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Server answered `"success": false`
    #[error("{0}")]
    Api(String),

    /// Non-2xx status without an error document
    #[error("server responded with HTTP {0}")]
    Status(u16),

    #[error("empty response")]
    EmptyResponse,
}

impl WeatherError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        WeatherError::InvalidInput(msg.into())
    }

    /// Process exit status for the CLI
    pub fn exit_code(&self) -> i32 {
        match self {
            WeatherError::InvalidInput(_) => EXIT_INVALID_ARGS,
            WeatherError::Net(err) => match err.kind() {
                ErrorKind::InvalidArgument => EXIT_INVALID_ARGS,
                ErrorKind::Timeout | ErrorKind::Connection | ErrorKind::Io => EXIT_NETWORK_ERROR,
                ErrorKind::Protocol => EXIT_SERVER_ERROR,
            },
            WeatherError::Json(_)
            | WeatherError::Api(_)
            | WeatherError::Status(_)
            | WeatherError::EmptyResponse => EXIT_SERVER_ERROR,
        }
    }
}

/// Result type for weather client operations
pub type Result<T> = std::result::Result<T, WeatherError>;

#[cfg(test)]
mod tests {
    use super::*;
    use just_weather_core::Error;

    #[test]
    fn test_exit_codes() {
        assert_eq!(WeatherError::invalid_input("city").exit_code(), 1);
        assert_eq!(WeatherError::from(Error::timeout("t")).exit_code(), 2);
        assert_eq!(WeatherError::from(Error::connection("c")).exit_code(), 2);
        assert_eq!(WeatherError::from(Error::protocol("p")).exit_code(), 3);
        assert_eq!(WeatherError::Api("City not found".into()).exit_code(), 3);
        assert_eq!(WeatherError::EmptyResponse.exit_code(), 3);
    }

    #[test]
    fn test_display() {
        assert_eq!(WeatherError::Api("City not found".into()).to_string(), "City not found");
        assert_eq!(
            WeatherError::from(Error::timeout("no data received within 5000 ms")).to_string(),
            "operation timed out: no data received within 5000 ms"
        );
        assert_eq!(WeatherError::Status(502).to_string(), "server responded with HTTP 502");
    }
}
