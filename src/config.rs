//! Configuration management for the CityWeather service
//!
//! Handles loading configuration from files and environment variables,
//! and provides validation for all configuration settings.

use crate::CityWeatherError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure for the CityWeather service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CityWeatherConfig {
    /// City directory provider configuration
    pub directory: DirectoryConfig,
    /// Forecast provider configuration
    pub weather: WeatherConfig,
    /// Cache configuration
    pub cache: CacheConfig,
    /// HTTP server configuration
    pub server: ServerConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// City directory provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryConfig {
    /// Base URL of the place directory API
    #[serde(default = "default_directory_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u32,
    /// Maximum number of retries for failed requests
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// How long a fetched directory stays fresh, in hours
    #[serde(default = "default_directory_ttl")]
    pub cache_ttl_hours: u32,
}

/// Forecast provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// OpenWeatherMap API key
    pub api_key: Option<String>,
    /// Base URL of the forecast API
    #[serde(default = "default_weather_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u32,
    /// Maximum number of retries for failed requests
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// How long a fetched forecast stays fresh, in hours
    #[serde(default = "default_weather_ttl")]
    pub cache_ttl_hours: u32,
}

/// Cache storage settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Cache directory location
    #[serde(default = "default_cache_location")]
    pub location: String,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Port the API listens on
    #[serde(default = "default_server_port")]
    pub port: u16,
    /// Default number of cities returned by the top-cities endpoints
    #[serde(default = "default_top_cities")]
    pub top_cities: u32,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_directory_base_url() -> String {
    "https://search.reservamos.mx/api/v2".to_string()
}

fn default_weather_base_url() -> String {
    "https://api.openweathermap.org/data/2.5".to_string()
}

fn default_timeout() -> u32 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_directory_ttl() -> u32 {
    24
}

fn default_weather_ttl() -> u32 {
    1
}

fn default_cache_location() -> String {
    "~/.cache/cityweather".to_string()
}

fn default_server_port() -> u16 {
    3001
}

fn default_top_cities() -> u32 {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for CityWeatherConfig {
    fn default() -> Self {
        Self {
            directory: DirectoryConfig {
                base_url: default_directory_base_url(),
                timeout_seconds: default_timeout(),
                max_retries: default_max_retries(),
                cache_ttl_hours: default_directory_ttl(),
            },
            weather: WeatherConfig {
                api_key: None,
                base_url: default_weather_base_url(),
                timeout_seconds: default_timeout(),
                max_retries: default_max_retries(),
                cache_ttl_hours: default_weather_ttl(),
            },
            cache: CacheConfig {
                location: default_cache_location(),
            },
            server: ServerConfig {
                port: default_server_port(),
                top_cities: default_top_cities(),
            },
            logging: LoggingConfig {
                level: default_log_level(),
                format: default_log_format(),
            },
        }
    }
}

impl CityWeatherConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // Environment variable overrides with CITYWEATHER_ prefix
        builder = builder.add_source(
            Environment::with_prefix("CITYWEATHER")
                .separator("_")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: CityWeatherConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("cityweather").join("config.toml"))
    }

    /// Resolve the cache directory, expanding a leading `~`
    #[must_use]
    pub fn cache_dir(&self) -> PathBuf {
        if let Some(rest) = self.cache.location.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(rest);
            }
        }
        PathBuf::from(&self.cache.location)
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.directory.base_url.is_empty() {
            self.directory.base_url = default_directory_base_url();
        }
        if self.directory.timeout_seconds == 0 {
            self.directory.timeout_seconds = default_timeout();
        }
        if self.directory.cache_ttl_hours == 0 {
            self.directory.cache_ttl_hours = default_directory_ttl();
        }
        if self.weather.base_url.is_empty() {
            self.weather.base_url = default_weather_base_url();
        }
        if self.weather.timeout_seconds == 0 {
            self.weather.timeout_seconds = default_timeout();
        }
        if self.weather.cache_ttl_hours == 0 {
            self.weather.cache_ttl_hours = default_weather_ttl();
        }
        if self.cache.location.is_empty() {
            self.cache.location = default_cache_location();
        }
        if self.server.port == 0 {
            self.server.port = default_server_port();
        }
        if self.server.top_cities == 0 {
            self.server.top_cities = default_top_cities();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_api_keys()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate API keys and credentials
    pub fn validate_api_keys(&self) -> Result<()> {
        if let Some(api_key) = &self.weather.api_key {
            if api_key.is_empty() {
                return Err(CityWeatherError::config(
                    "Weather API key cannot be empty if provided. Either remove it or provide a valid key."
                ).into());
            }

            if api_key.len() < 8 {
                return Err(CityWeatherError::config(
                    "Weather API key appears to be invalid (too short). Please check your API key."
                ).into());
            }

            if api_key.len() > 100 {
                return Err(CityWeatherError::config(
                    "Weather API key appears to be invalid (too long). Please check your API key."
                ).into());
            }
        }

        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.directory.timeout_seconds > 300 || self.weather.timeout_seconds > 300 {
            return Err(
                CityWeatherError::config("Provider timeout cannot exceed 300 seconds").into(),
            );
        }

        if self.directory.max_retries > 10 || self.weather.max_retries > 10 {
            return Err(CityWeatherError::config("Provider max retries cannot exceed 10").into());
        }

        if self.directory.cache_ttl_hours > 168 || self.weather.cache_ttl_hours > 168 {
            return Err(
                CityWeatherError::config("Cache TTL cannot exceed 168 hours (1 week)").into(),
            );
        }

        if self.server.top_cities > 100 {
            return Err(CityWeatherError::config("Top city count cannot exceed 100").into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(CityWeatherError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(CityWeatherError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        for base_url in [&self.directory.base_url, &self.weather.base_url] {
            if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
                return Err(CityWeatherError::config(
                    "Provider base URL must be a valid HTTP or HTTPS URL",
                )
                .into());
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CityWeatherConfig::default();
        assert_eq!(config.directory.base_url, "https://search.reservamos.mx/api/v2");
        assert_eq!(config.weather.base_url, "https://api.openweathermap.org/data/2.5");
        assert_eq!(config.directory.cache_ttl_hours, 24);
        assert_eq!(config.weather.cache_ttl_hours, 1);
        assert_eq!(config.server.port, 3001);
        assert_eq!(config.server.top_cities, 10);
        assert_eq!(config.logging.level, "info");
        assert!(config.weather.api_key.is_none());
    }

    #[test]
    fn test_config_validation_api_key() {
        let mut config = CityWeatherConfig::default();
        assert!(config.validate_api_keys().is_ok());

        config.weather.api_key = Some("valid_api_key_123".to_string());
        assert!(config.validate_api_keys().is_ok());

        config.weather.api_key = Some("short".to_string());
        assert!(config.validate_api_keys().is_err());
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = CityWeatherConfig::default();
        config.logging.level = "invalid".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_config_validation_numeric_ranges() {
        let mut config = CityWeatherConfig::default();
        config.weather.timeout_seconds = 500;
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("timeout cannot exceed"));
    }

    #[test]
    fn test_apply_defaults_restores_empty_fields() {
        let mut config = CityWeatherConfig::default();
        config.directory.base_url = String::new();
        config.logging.level = String::new();
        config.apply_defaults();

        assert_eq!(config.directory.base_url, default_directory_base_url());
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_config_path_generation() {
        let path = CityWeatherConfig::get_config_path();
        assert!(path.is_some());
        let path = path.unwrap();
        assert!(path.to_string_lossy().contains("cityweather"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_cache_dir_expands_home() {
        let config = CityWeatherConfig::default();
        let dir = config.cache_dir();
        assert!(!dir.to_string_lossy().starts_with("~"));
    }
}
