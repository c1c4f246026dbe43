//! Forecast provider client for the OpenWeatherMap 5-day/3-hour feed

use async_trait::async_trait;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::WeatherConfig;
use crate::models::ForecastSample;
use crate::{CityWeatherError, Result};

/// Capability to fetch the interval forecast feed for a resolved city,
/// keyed by its forecast query name.
#[async_trait]
pub trait ForecastProvider: Send + Sync {
    /// Fetch the multi-day interval forecast for a city query name.
    ///
    /// A provider response that cannot be used (non-success status, empty
    /// feed) surfaces as [`CityWeatherError::ForecastUnavailable`] rather
    /// than as an empty sequence, so callers never silently aggregate over
    /// nothing.
    async fn fetch_forecast(&self, query_name: &str) -> Result<Vec<ForecastSample>>;
}

/// HTTP client for the OpenWeatherMap forecast API.
pub struct OpenWeatherClient {
    client: ClientWithMiddleware,
    base_url: String,
    api_key: String,
}

impl OpenWeatherClient {
    /// Create a new forecast client with timeout and retry middleware.
    ///
    /// The API key is mandatory; without one every forecast request would
    /// come back 401.
    pub fn new(config: &WeatherConfig) -> Result<Self> {
        let api_key = config.api_key.clone().ok_or_else(|| {
            CityWeatherError::config(
                "OpenWeatherMap API key is required. Set CITYWEATHER_WEATHER_API_KEY or weather.api_key in config.toml.",
            )
        })?;

        let inner = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .user_agent(concat!("cityweather/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CityWeatherError::weather(e.to_string()))?;

        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(config.max_retries);
        let client = ClientBuilder::new(inner)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }
}

#[async_trait]
impl ForecastProvider for OpenWeatherClient {
    async fn fetch_forecast(&self, query_name: &str) -> Result<Vec<ForecastSample>> {
        let url = format!(
            "{}/forecast?q={}&appid={}",
            self.base_url,
            urlencoding::encode(query_name),
            self.api_key
        );
        debug!("Fetching forecast for '{}'", query_name);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| CityWeatherError::weather(e.to_string()))?;

        if !response.status().is_success() {
            // The provider answers 404 for names it does not know and 5xx
            // on its own trouble; either way there is no usable payload
            warn!(
                "Forecast request for '{}' failed with status {}",
                query_name,
                response.status()
            );
            return Err(CityWeatherError::forecast_unavailable(query_name));
        }

        let payload: openweather::ForecastResponse = response
            .json()
            .await
            .map_err(|e| CityWeatherError::weather(format!("Invalid forecast payload: {e}")))?;

        let samples = openweather::to_samples(payload);
        if samples.is_empty() {
            return Err(CityWeatherError::forecast_unavailable(query_name));
        }

        info!(
            "Fetched {} forecast samples for '{}'",
            samples.len(),
            query_name
        );
        Ok(samples)
    }
}

/// OpenWeatherMap API response structures and conversion utilities
pub mod openweather {
    use chrono::DateTime;
    use serde::Deserialize;

    use crate::models::ForecastSample;

    /// 5-day/3-hour forecast response from OpenWeatherMap
    #[derive(Debug, Deserialize)]
    pub struct ForecastResponse {
        #[serde(default)]
        pub list: Vec<ForecastEntry>,
    }

    /// One 3-hour interval entry
    #[derive(Debug, Deserialize)]
    pub struct ForecastEntry {
        /// Unix timestamp (seconds) of the interval
        pub dt: i64,
        pub main: MainReadings,
        #[serde(default)]
        pub weather: Vec<ConditionEntry>,
        #[serde(default)]
        pub wind: WindReadings,
    }

    /// Temperature and humidity block; temperatures are in Kelvin
    #[derive(Debug, Deserialize)]
    pub struct MainReadings {
        pub temp: f64,
        pub temp_min: f64,
        pub temp_max: f64,
        #[serde(default)]
        pub humidity: f64,
    }

    /// Condition label block; `main` is the short label ("Rain", "Clouds")
    #[derive(Debug, Deserialize)]
    pub struct ConditionEntry {
        pub main: String,
        #[serde(default)]
        pub description: String,
    }

    #[derive(Debug, Default, Deserialize)]
    pub struct WindReadings {
        #[serde(default)]
        pub speed: f64,
    }

    /// Convert a wire response into the internal sample sequence.
    ///
    /// Entries with an unrepresentable timestamp are skipped; a missing
    /// condition block becomes an empty label, which downstream
    /// classification treats as the catch-all category.
    #[must_use]
    pub fn to_samples(response: ForecastResponse) -> Vec<ForecastSample> {
        response
            .list
            .into_iter()
            .filter_map(|entry| {
                let timestamp = DateTime::from_timestamp(entry.dt, 0)?;
                let condition = entry
                    .weather
                    .first()
                    .map(|w| w.main.clone())
                    .unwrap_or_default();

                Some(ForecastSample {
                    timestamp,
                    temperature: entry.main.temp,
                    temp_min: entry.main.temp_min,
                    temp_max: entry.main.temp_max,
                    condition,
                    humidity: entry.main.humidity,
                    wind_speed: entry.wind.speed,
                })
            })
            .collect()
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CityWeatherConfig;

    #[test]
    fn test_client_requires_api_key() {
        let config = CityWeatherConfig::default().weather;
        let result = OpenWeatherClient::new(&config);
        assert!(matches!(result, Err(CityWeatherError::Config { .. })));
    }

    #[test]
    fn test_client_builds_with_api_key() {
        let mut config = CityWeatherConfig::default().weather;
        config.api_key = Some("test_api_key_123".to_string());
        let client = OpenWeatherClient::new(&config).unwrap();
        assert_eq!(client.base_url, "https://api.openweathermap.org/data/2.5");
    }
}
