//! API endpoints: request paths, cache keys and lifetimes

use std::time::Duration;

use just_weather_core::CacheKey;

use crate::error::{Result, WeatherError};

/// Lifetime of current-conditions and city weather responses
pub const TTL_WEATHER: Duration = Duration::from_secs(300);
/// Lifetime of city search results
pub const TTL_CITIES: Duration = Duration::from_secs(3600);
/// Lifetime of the API homepage
pub const TTL_HOMEPAGE: Duration = Duration::from_secs(86400);

/// Shortest accepted city search query, in characters
pub const MIN_QUERY_LEN: usize = 2;

/// One request the API understands
#[derive(Debug, Clone, PartialEq)]
pub enum Endpoint {
    Current {
        lat: f64,
        lon: f64,
    },
    Weather {
        city: String,
        country: Option<String>,
        region: Option<String>,
    },
    Cities {
        query: String,
    },
    Homepage,
    Echo,
}

impl Endpoint {
    /// Current conditions at a coordinate
    pub fn current(lat: f64, lon: f64) -> Result<Self> {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(WeatherError::invalid_input(format!(
                "latitude {lat} is outside [-90, 90]"
            )));
        }
        if !(-180.0..=180.0).contains(&lon) {
            return Err(WeatherError::invalid_input(format!(
                "longitude {lon} is outside [-180, 180]"
            )));
        }
        Ok(Endpoint::Current { lat, lon })
    }

    /// Weather for a named city; empty country/region are treated as absent
    pub fn weather(city: &str, country: Option<&str>, region: Option<&str>) -> Result<Self> {
        if city.trim().is_empty() {
            return Err(WeatherError::invalid_input("city name must not be empty"));
        }
        let present = |s: Option<&str>| s.filter(|s| !s.is_empty()).map(str::to_string);
        Ok(Endpoint::Weather {
            city: city.to_string(),
            country: present(country),
            region: present(region),
        })
    }

    pub fn cities(query: &str) -> Result<Self> {
        if query.chars().count() < MIN_QUERY_LEN {
            return Err(WeatherError::invalid_input(format!(
                "query must be at least {MIN_QUERY_LEN} characters"
            )));
        }
        Ok(Endpoint::Cities {
            query: query.to_string(),
        })
    }

    /// Origin-form path and query string
    pub fn path(&self) -> String {
        match self {
            Endpoint::Current { lat, lon } => format!("/v1/current?lat={lat:.4}&lon={lon:.4}"),
            Endpoint::Weather {
                city,
                country,
                region,
            } => {
                let mut path = format!("/v1/weather?city={}", urlencoding::encode(city));
                if let Some(country) = country {
                    path.push_str("&country=");
                    path.push_str(&urlencoding::encode(country));
                }
                if let Some(region) = region {
                    path.push_str("&region=");
                    path.push_str(&urlencoding::encode(region));
                }
                path
            }
            Endpoint::Cities { query } => {
                format!("/v1/cities?query={}", urlencoding::encode(query))
            }
            Endpoint::Homepage => "/".to_string(),
            Endpoint::Echo => "/echo".to_string(),
        }
    }

    /// Normalized fingerprint, `None` for endpoints that are never cached
    pub fn cache_key(&self) -> Option<String> {
        let key = match self {
            Endpoint::Current { lat, lon } => CacheKey::new("current")
                .raw_param("lat", format!("{lat:.4}"))
                .raw_param("lon", format!("{lon:.4}")),
            Endpoint::Weather {
                city,
                country,
                region,
            } => CacheKey::new("weather")
                .param("city", city)
                .param("country", country.as_deref().unwrap_or_default())
                .param("region", region.as_deref().unwrap_or_default()),
            Endpoint::Cities { query } => CacheKey::new("cities").param("query", query),
            Endpoint::Homepage => CacheKey::new("homepage"),
            Endpoint::Echo => return None,
        };
        Some(key.to_string())
    }

    /// How long a response stays fresh unless the server says otherwise
    pub fn ttl(&self) -> Duration {
        match self {
            Endpoint::Current { .. } | Endpoint::Weather { .. } => TTL_WEATHER,
            Endpoint::Cities { .. } => TTL_CITIES,
            Endpoint::Homepage | Endpoint::Echo => TTL_HOMEPAGE,
        }
    }

    /// Short label for logs
    pub fn name(&self) -> &'static str {
        match self {
            Endpoint::Current { .. } => "current",
            Endpoint::Weather { .. } => "weather",
            Endpoint::Cities { .. } => "cities",
            Endpoint::Homepage => "homepage",
            Endpoint::Echo => "echo",
        }
    }
}
