//! Data models for the CityWeather service
//!
//! This module contains the core domain models organized by concern:
//! - City: raw directory records and normalized catalog entries
//! - Forecast: interval forecast samples and derived daily summaries

pub mod city;
pub mod forecast;

// Re-export all public types for convenient access
pub use city::{NormalizedCity, PlaceRecord};
pub use forecast::{CurrentConditions, DailySummary, ForecastSample};
