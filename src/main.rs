use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use cityweather::config::{CityWeatherConfig, LoggingConfig};
use cityweather::{OpenWeatherClient, PersistentCache, PlacesClient, WeatherService};

fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    if logging.format == "json" {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CityWeatherConfig::load()?;
    init_tracing(&config.logging);

    let cache_dir = config.cache_dir();
    std::fs::create_dir_all(&cache_dir)
        .with_context(|| format!("Failed to create cache directory {}", cache_dir.display()))?;
    let cache = Arc::new(PersistentCache::open(&cache_dir)?);

    let directory = Arc::new(PlacesClient::new(&config.directory)?);
    let forecast = Arc::new(OpenWeatherClient::new(&config.weather)?);
    let service = Arc::new(WeatherService::new(&config, directory, forecast, cache));

    tracing::info!(
        "CityWeather starting (directory TTL {}h, forecast TTL {}h, top {} cities)",
        config.directory.cache_ttl_hours,
        config.weather.cache_ttl_hours,
        config.server.top_cities
    );

    cityweather::web::run(service, config.server.port).await
}
