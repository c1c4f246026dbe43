//! Service orchestration: catalog, resolution, forecasts and caching
//!
//! Wires the pure core (normalization, selection, aggregation) to the
//! external collaborators (directory provider, forecast provider, TTL
//! cache). Raw provider payloads are what gets cached; derived data is
//! recomputed on every call so a cache refresh is the only freshness
//! boundary the system has.

use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::cache::PersistentCache;
use crate::catalog;
use crate::config::CityWeatherConfig;
use crate::forecast::DailyAggregator;
use crate::models::{CurrentConditions, DailySummary, ForecastSample, NormalizedCity, PlaceRecord};
use crate::places::CityDirectory;
use crate::weather::ForecastProvider;
use crate::{CityWeatherError, Result};

const CITIES_CACHE_KEY: &str = "cities_list";

/// Bound on in-flight forecast fetches when building a batched report
const MAX_CONCURRENT_FORECASTS: usize = 4;

/// Everything the presentation layer needs for one city.
#[derive(Debug, Clone, Serialize)]
pub struct CityWeatherReport {
    /// The resolved catalog entry
    pub city: NormalizedCity,
    /// Present-moment reading from the feed's first sample
    pub current: CurrentConditions,
    /// Per-day summaries for the upcoming days
    pub daily: Vec<DailySummary>,
}

/// City catalog and forecast orchestration service.
pub struct WeatherService {
    directory: Arc<dyn CityDirectory>,
    forecast: Arc<dyn ForecastProvider>,
    cache: Arc<PersistentCache>,
    aggregator: DailyAggregator,
    directory_ttl: Duration,
    forecast_ttl: Duration,
    top_limit: usize,
}

impl WeatherService {
    /// Assemble the service from its collaborators.
    pub fn new(
        config: &CityWeatherConfig,
        directory: Arc<dyn CityDirectory>,
        forecast: Arc<dyn ForecastProvider>,
        cache: Arc<PersistentCache>,
    ) -> Self {
        Self {
            directory,
            forecast,
            cache,
            aggregator: DailyAggregator::default(),
            directory_ttl: Duration::from_secs(u64::from(config.directory.cache_ttl_hours) * 3600),
            forecast_ttl: Duration::from_secs(u64::from(config.weather.cache_ttl_hours) * 3600),
            top_limit: config.server.top_cities as usize,
        }
    }

    /// The normalized city catalog, recomputed from (possibly cached) raw
    /// directory records on every call.
    pub async fn city_catalog(&self) -> Result<Vec<NormalizedCity>> {
        let records = self.cached_places().await?;
        Ok(catalog::normalize(records))
    }

    /// The most popular cities, one per display name.
    pub async fn top_cities(&self, limit: Option<usize>) -> Result<Vec<NormalizedCity>> {
        let cities = self.city_catalog().await?;
        Ok(catalog::select_top(
            &cities,
            limit.unwrap_or(self.top_limit),
        ))
    }

    /// Current conditions and daily summaries for a city named by `query`.
    ///
    /// Fails with [`CityWeatherError::CityNotFound`] when the query matches
    /// no catalog entry, and with [`CityWeatherError::ForecastUnavailable`]
    /// when the matched city yields no usable forecast payload.
    pub async fn city_weather(&self, query: &str) -> Result<CityWeatherReport> {
        let cities = self.city_catalog().await?;
        let city = catalog::resolve(&cities, query)
            .cloned()
            .ok_or_else(|| CityWeatherError::city_not_found(query))?;

        self.report_for(city).await
    }

    /// Reports for the top cities, fetched with bounded concurrency.
    ///
    /// Ranking order is preserved. A city whose forecast cannot be fetched
    /// is logged and dropped from the batch rather than failing it.
    pub async fn top_city_weather(&self, limit: Option<usize>) -> Result<Vec<CityWeatherReport>> {
        let top = self.top_cities(limit).await?;

        let results: Vec<(String, Result<CityWeatherReport>)> = stream::iter(top)
            .map(|city| async move {
                let name = city.display_name.clone();
                (name, self.report_for(city).await)
            })
            .buffered(MAX_CONCURRENT_FORECASTS)
            .collect()
            .await;

        let mut reports = Vec::with_capacity(results.len());
        for (name, result) in results {
            match result {
                Ok(report) => reports.push(report),
                Err(e) => warn!("Skipping '{}' in top-city report: {}", name, e),
            }
        }
        Ok(reports)
    }

    async fn report_for(&self, city: NormalizedCity) -> Result<CityWeatherReport> {
        let query_name = city.query_name().to_string();
        let samples = self.cached_samples(&query_name).await?;

        let current = samples
            .first()
            .map(CurrentConditions::from_sample)
            .ok_or_else(|| CityWeatherError::forecast_unavailable(&query_name))?;
        let daily = self.aggregator.aggregate(&samples);

        Ok(CityWeatherReport {
            city,
            current,
            daily,
        })
    }

    async fn cached_places(&self) -> Result<Vec<PlaceRecord>> {
        if let Some(records) = self.cache_get::<Vec<PlaceRecord>>(CITIES_CACHE_KEY).await {
            debug!("Directory served from cache ({} records)", records.len());
            return Ok(records);
        }

        let records = self.directory.fetch_places().await?;
        self.cache_put(CITIES_CACHE_KEY, records.clone(), self.directory_ttl)
            .await;
        Ok(records)
    }

    async fn cached_samples(&self, query_name: &str) -> Result<Vec<ForecastSample>> {
        let key = format!("weather_{query_name}");

        if let Some(samples) = self.cache_get::<Vec<ForecastSample>>(&key).await {
            debug!("Forecast for '{}' served from cache", query_name);
            return Ok(samples);
        }

        let samples = self.forecast.fetch_forecast(query_name).await?;
        self.cache_put(&key, samples.clone(), self.forecast_ttl).await;
        Ok(samples)
    }

    /// Cache reads degrade to a miss on failure; a broken cache must never
    /// take a request down with it.
    async fn cache_get<T: serde::de::DeserializeOwned + Send + 'static>(
        &self,
        key: &str,
    ) -> Option<T> {
        match self.cache.get(key).await {
            Ok(value) => value,
            Err(e) => {
                warn!("Cache read for '{}' failed: {}", key, e);
                None
            }
        }
    }

    async fn cache_put<T: Serialize + Send + std::fmt::Debug + 'static>(
        &self,
        key: &str,
        value: T,
        ttl: Duration,
    ) {
        if let Err(e) = self.cache.put(key, value, ttl).await {
            warn!("Cache write for '{}' failed: {}", key, e);
        }
    }
}
