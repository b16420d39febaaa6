//! just-weather: command-line client for the just-weather API
//!
//! Built on a small self-contained network stack:
//!
//! - [`just_weather_net`]: TCP transport with connect/receive timeouts and an
//!   HTTP/1.1 GET client (content-length, chunked and close-delimited bodies)
//! - [`just_weather_cache`]: bounded response cache persisted as JSON files
//!   with per-entry TTL
//! - [`WeatherClient`]: endpoint URLs, normalized cache keys and API error
//!   handling on top of both
//! - [`RequestScheduler`]: steps several requests forward side by side on one
//!   thread
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use just_weather::prelude::*;
//!
//! let config = WeatherClientConfig::new("localhost", 10680);
//! let mut client = WeatherClient::new(config);
//!
//! let weather = client.weather_by_city("Stockholm", Some("SE"), None)?;
//! println!("{}", serde_json::to_string_pretty(&weather)?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod client;
mod config;
mod error;
mod query;
mod scheduler;

pub use client::WeatherClient;
pub use config::{DEFAULT_PORT, WeatherClientConfig};
pub use error::{EXIT_INVALID_ARGS, EXIT_NETWORK_ERROR, EXIT_SERVER_ERROR, Result, WeatherError};
pub use query::{Endpoint, MIN_QUERY_LEN, TTL_CITIES, TTL_HOMEPAGE, TTL_WEATHER};
pub use scheduler::{Callback, MAX_TASKS, RequestScheduler, TaskId, TaskState};

pub use just_weather_cache::{CacheConfig, ResponseCache};
pub use just_weather_net::{HttpClient, HttpClientConfig, HttpResponse};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        CacheConfig, Endpoint, HttpClient, HttpClientConfig, HttpResponse, RequestScheduler,
        ResponseCache, TaskState, WeatherClient, WeatherClientConfig, WeatherError,
    };
}

#[cfg(test)]
mod tests;
