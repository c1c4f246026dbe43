//! CityWeather - city catalog and short-range weather forecasts
//!
//! This library normalizes a raw city directory into a rankable catalog and
//! aggregates a fine-grained multi-day forecast feed into per-day summaries
//! for presentation.

pub mod api;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod error;
pub mod forecast;
pub mod icons;
pub mod models;
pub mod places;
pub mod service;
pub mod weather;
pub mod web;

// Re-export core types for public API
pub use cache::PersistentCache;
pub use config::CityWeatherConfig;
pub use error::CityWeatherError;
pub use forecast::DailyAggregator;
pub use icons::WeatherIcon;
pub use models::{CurrentConditions, DailySummary, ForecastSample, NormalizedCity, PlaceRecord};
pub use places::{CityDirectory, PlacesClient};
pub use service::{CityWeatherReport, WeatherService};
pub use weather::{ForecastProvider, OpenWeatherClient};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, CityWeatherError>;
