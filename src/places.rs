//! City directory provider client
//!
//! Fetches the raw place directory the catalog is normalized from. The
//! directory is read-only input; everything beyond the handful of consumed
//! fields is dropped at deserialization.

use async_trait::async_trait;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use std::time::Duration;
use tracing::{debug, info};

use crate::config::DirectoryConfig;
use crate::models::PlaceRecord;
use crate::{CityWeatherError, Result};

/// Capability to fetch the raw city directory. Injected into the service so
/// tests can substitute a fixture-backed implementation.
#[async_trait]
pub trait CityDirectory: Send + Sync {
    /// Fetch the full place directory from the provider.
    async fn fetch_places(&self) -> Result<Vec<PlaceRecord>>;
}

/// HTTP client for the place directory API.
pub struct PlacesClient {
    client: ClientWithMiddleware,
    base_url: String,
}

impl PlacesClient {
    /// Create a new directory client with timeout and retry middleware.
    pub fn new(config: &DirectoryConfig) -> Result<Self> {
        let inner = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .user_agent(concat!("cityweather/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CityWeatherError::directory(e.to_string()))?;

        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(config.max_retries);
        let client = ClientBuilder::new(inner)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl CityDirectory for PlacesClient {
    async fn fetch_places(&self) -> Result<Vec<PlaceRecord>> {
        let url = format!("{}/places", self.base_url);
        debug!("Fetching city directory from {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| CityWeatherError::directory(e.to_string()))?;

        if !response.status().is_success() {
            return Err(CityWeatherError::directory(format!(
                "Directory request failed with status {}",
                response.status()
            )));
        }

        let places: Vec<PlaceRecord> = response
            .json()
            .await
            .map_err(|e| CityWeatherError::directory(format!("Invalid directory payload: {e}")))?;

        info!("Fetched {} directory records", places.len());
        Ok(places)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CityWeatherConfig;

    #[test]
    fn test_client_builds_from_default_config() {
        let config = CityWeatherConfig::default();
        let client = PlacesClient::new(&config.directory).unwrap();
        assert_eq!(client.base_url, "https://search.reservamos.mx/api/v2");
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let mut config = CityWeatherConfig::default().directory;
        config.base_url = "https://example.test/api/".to_string();
        let client = PlacesClient::new(&config).unwrap();
        assert_eq!(client.base_url, "https://example.test/api");
    }
}
