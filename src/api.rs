//! HTTP API surface
//!
//! Thin presentation layer over [`WeatherService`]: DTO conversions, icon
//! labeling and error-to-status mapping live here, nothing else.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::icons::WeatherIcon;
use crate::models::{CurrentConditions, DailySummary, NormalizedCity};
use crate::service::{CityWeatherReport, WeatherService};
use crate::CityWeatherError;

#[derive(Serialize)]
pub struct ApiCity {
    pub city_name: String,
    pub display_name: String,
    pub state: Option<String>,
    pub popularity: Option<f64>,
}

#[derive(Serialize)]
pub struct ApiCurrentConditions {
    pub temperature_c: i32,
    pub temp_min_c: i32,
    pub temp_max_c: i32,
    pub condition: String,
    pub icon: WeatherIcon,
    pub humidity: f64,
    pub wind_speed_ms: f64,
}

#[derive(Serialize)]
pub struct ApiDailySummary {
    pub date: NaiveDate,
    pub min_temp_c: i32,
    pub max_temp_c: i32,
    pub avg_temp_c: i32,
    pub condition: String,
    pub icon: WeatherIcon,
}

#[derive(Serialize)]
pub struct ApiCityWeather {
    pub city: ApiCity,
    pub current: ApiCurrentConditions,
    pub daily: Vec<ApiDailySummary>,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

#[derive(Deserialize)]
pub struct TopQuery {
    pub limit: Option<usize>,
}

impl From<&NormalizedCity> for ApiCity {
    fn from(city: &NormalizedCity) -> Self {
        Self {
            city_name: city.city_name.clone(),
            display_name: city.display_name.clone(),
            state: city.state.clone(),
            popularity: city.popularity,
        }
    }
}

impl From<&CurrentConditions> for ApiCurrentConditions {
    fn from(current: &CurrentConditions) -> Self {
        Self {
            temperature_c: current.temperature_c,
            temp_min_c: current.temp_min_c,
            temp_max_c: current.temp_max_c,
            icon: WeatherIcon::classify(&current.condition),
            condition: current.condition.clone(),
            humidity: current.humidity,
            wind_speed_ms: current.wind_speed,
        }
    }
}

impl From<&DailySummary> for ApiDailySummary {
    fn from(summary: &DailySummary) -> Self {
        Self {
            date: summary.date,
            min_temp_c: summary.min_temp_c,
            max_temp_c: summary.max_temp_c,
            avg_temp_c: summary.avg_temp_c,
            icon: WeatherIcon::classify(&summary.dominant_condition),
            condition: summary.dominant_condition.clone(),
        }
    }
}

impl From<&CityWeatherReport> for ApiCityWeather {
    fn from(report: &CityWeatherReport) -> Self {
        Self {
            city: ApiCity::from(&report.city),
            current: ApiCurrentConditions::from(&report.current),
            daily: report.daily.iter().map(ApiDailySummary::from).collect(),
        }
    }
}

/// Service errors rendered as JSON bodies with the right status code.
pub struct ApiError(CityWeatherError);

impl From<CityWeatherError> for ApiError {
    fn from(err: CityWeatherError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            CityWeatherError::CityNotFound { .. } => StatusCode::NOT_FOUND,
            CityWeatherError::ForecastUnavailable { .. } => StatusCode::BAD_REQUEST,
            _ => {
                error!("Request failed: {}", self.0);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = ErrorBody {
            error: self.0.user_message(),
        };
        (status, Json(body)).into_response()
    }
}

pub fn router(service: Arc<WeatherService>) -> Router {
    Router::new()
        .route("/cities", get(list_cities))
        .route("/cities/top", get(top_cities))
        .route("/cities/top/weather", get(top_city_weather))
        .route("/cities/{name}/weather", get(city_weather))
        .with_state(service)
}

async fn list_cities(
    State(service): State<Arc<WeatherService>>,
) -> Result<Json<Vec<ApiCity>>, ApiError> {
    let cities = service.city_catalog().await?;
    Ok(Json(cities.iter().map(ApiCity::from).collect()))
}

async fn top_cities(
    State(service): State<Arc<WeatherService>>,
    Query(query): Query<TopQuery>,
) -> Result<Json<Vec<ApiCity>>, ApiError> {
    let cities = service.top_cities(query.limit).await?;
    Ok(Json(cities.iter().map(ApiCity::from).collect()))
}

async fn top_city_weather(
    State(service): State<Arc<WeatherService>>,
    Query(query): Query<TopQuery>,
) -> Result<Json<Vec<ApiCityWeather>>, ApiError> {
    let reports = service.top_city_weather(query.limit).await?;
    Ok(Json(reports.iter().map(ApiCityWeather::from).collect()))
}

async fn city_weather(
    State(service): State<Arc<WeatherService>>,
    Path(name): Path<String>,
) -> Result<Json<ApiCityWeather>, ApiError> {
    let report = service.city_weather(&name).await?;
    Ok(Json(ApiCityWeather::from(&report)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_daily_summary_gets_icon_label() {
        let summary = DailySummary {
            date: NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
            min_temp_c: 14,
            max_temp_c: 23,
            avg_temp_c: 19,
            dominant_condition: "Rain".to_string(),
        };

        let dto = ApiDailySummary::from(&summary);
        assert_eq!(dto.icon, WeatherIcon::Rain);
        assert_eq!(dto.condition, "Rain");
    }

    #[test]
    fn test_error_statuses() {
        let not_found = ApiError(CityWeatherError::city_not_found("Atlantis")).into_response();
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);

        let unavailable =
            ApiError(CityWeatherError::forecast_unavailable("Lima")).into_response();
        assert_eq!(unavailable.status(), StatusCode::BAD_REQUEST);

        let internal = ApiError(CityWeatherError::cache("broken")).into_response();
        assert_eq!(internal.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
