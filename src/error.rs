//! Error types and handling for the CityWeather service

use thiserror::Error;

/// Main error type for the CityWeather service
#[derive(Error, Debug)]
pub enum CityWeatherError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// City directory provider communication errors
    #[error("Directory provider error: {message}")]
    Directory { message: String },

    /// Forecast provider communication errors
    #[error("Weather provider error: {message}")]
    Weather { message: String },

    /// A lookup query matched no catalog entry. An expected, frequent
    /// outcome, surfaced as data rather than a fault.
    #[error("City not found: {query}")]
    CityNotFound { query: String },

    /// The forecast fetch yielded no usable payload for a known city.
    /// Distinct from `CityNotFound` so callers can report a fetch failure
    /// rather than an identity failure.
    #[error("No forecast data available for: {query}")]
    ForecastUnavailable { query: String },

    /// Cache operation errors
    #[error("Cache error: {message}")]
    Cache { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl CityWeatherError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new directory provider error
    pub fn directory<S: Into<String>>(message: S) -> Self {
        Self::Directory {
            message: message.into(),
        }
    }

    /// Create a new forecast provider error
    pub fn weather<S: Into<String>>(message: S) -> Self {
        Self::Weather {
            message: message.into(),
        }
    }

    /// Create a new city-not-found outcome
    pub fn city_not_found<S: Into<String>>(query: S) -> Self {
        Self::CityNotFound {
            query: query.into(),
        }
    }

    /// Create a new forecast-unavailable outcome
    pub fn forecast_unavailable<S: Into<String>>(query: S) -> Self {
        Self::ForecastUnavailable {
            query: query.into(),
        }
    }

    /// Create a new cache error
    pub fn cache<S: Into<String>>(message: S) -> Self {
        Self::Cache {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            CityWeatherError::Config { .. } => {
                "Configuration error. Please check your config file and API keys.".to_string()
            }
            CityWeatherError::Directory { .. } | CityWeatherError::Weather { .. } => {
                "Unable to connect to external services. Please try again later.".to_string()
            }
            CityWeatherError::CityNotFound { .. } => "City not found".to_string(),
            CityWeatherError::ForecastUnavailable { .. } => {
                "Unable to fetch weather data".to_string()
            }
            CityWeatherError::Cache { .. } => {
                "Cache operation failed. You may need to clear your cache.".to_string()
            }
            CityWeatherError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let config_err = CityWeatherError::config("missing API key");
        assert!(matches!(config_err, CityWeatherError::Config { .. }));

        let directory_err = CityWeatherError::directory("connection failed");
        assert!(matches!(directory_err, CityWeatherError::Directory { .. }));

        let missing = CityWeatherError::city_not_found("Atlantis");
        assert!(matches!(missing, CityWeatherError::CityNotFound { .. }));
    }

    #[test]
    fn test_not_found_and_unavailable_are_distinct() {
        let not_found = CityWeatherError::city_not_found("Atlantis");
        let unavailable = CityWeatherError::forecast_unavailable("Atlantis");

        assert_eq!(not_found.user_message(), "City not found");
        assert_eq!(unavailable.user_message(), "Unable to fetch weather data");
    }

    #[test]
    fn test_user_messages() {
        let config_err = CityWeatherError::config("test");
        assert!(config_err.user_message().contains("Configuration error"));

        let weather_err = CityWeatherError::weather("test");
        assert!(weather_err.user_message().contains("Unable to connect"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: CityWeatherError = io_err.into();
        assert!(matches!(err, CityWeatherError::Io { .. }));
    }
}
