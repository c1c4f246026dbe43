//! Forecast samples and derived daily summaries

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One interval sample from the forecast provider's multi-day feed.
///
/// Samples arrive timestamp-ascending at roughly 3-hour granularity and
/// cover about 5 days. Temperatures are in Kelvin as shipped on the wire;
/// conversion to Celsius happens only at summary/presentation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastSample {
    /// Moment this sample is valid for
    pub timestamp: DateTime<Utc>,
    /// Temperature in Kelvin
    pub temperature: f64,
    /// Interval minimum temperature in Kelvin
    pub temp_min: f64,
    /// Interval maximum temperature in Kelvin
    pub temp_max: f64,
    /// Condition label, e.g. "Clear", "Rain", "Clouds"
    pub condition: String,
    /// Relative humidity in percent
    pub humidity: f64,
    /// Wind speed in m/s
    pub wind_speed: f64,
}

impl ForecastSample {
    /// Convert a Kelvin temperature to rounded integer Celsius.
    #[must_use]
    pub fn kelvin_to_celsius(kelvin: f64) -> i32 {
        (kelvin - 273.15).round() as i32
    }
}

/// Aggregated forecast for one calendar day, built fresh per aggregation
/// call and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    /// Local calendar day the summary covers
    pub date: NaiveDate,
    /// Lowest interval temperature of the day, rounded °C
    pub min_temp_c: i32,
    /// Highest interval temperature of the day, rounded °C
    pub max_temp_c: i32,
    /// Mean interval temperature of the day (averaged in Kelvin), rounded °C
    pub avg_temp_c: i32,
    /// Condition label with the highest occurrence count that day
    pub dominant_condition: String,
}

/// Present-moment reading derived from the first sample of a feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentConditions {
    /// Temperature in rounded °C
    pub temperature_c: i32,
    /// Interval minimum in rounded °C
    pub temp_min_c: i32,
    /// Interval maximum in rounded °C
    pub temp_max_c: i32,
    /// Condition label as reported by the provider
    pub condition: String,
    /// Relative humidity in percent
    pub humidity: f64,
    /// Wind speed in m/s
    pub wind_speed: f64,
}

impl CurrentConditions {
    /// Build current conditions from the feed's leading sample.
    #[must_use]
    pub fn from_sample(sample: &ForecastSample) -> Self {
        Self {
            temperature_c: ForecastSample::kelvin_to_celsius(sample.temperature),
            temp_min_c: ForecastSample::kelvin_to_celsius(sample.temp_min),
            temp_max_c: ForecastSample::kelvin_to_celsius(sample.temp_max),
            condition: sample.condition.clone(),
            humidity: sample.humidity,
            wind_speed: sample.wind_speed,
        }
    }
}
