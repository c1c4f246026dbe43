//! End-to-end forecast flow: provider payload through sample conversion,
//! daily aggregation and icon labeling.

use chrono::{Duration, Local, NaiveDate, TimeZone};
use cityweather::forecast::DailyAggregator;
use cityweather::weather::openweather::{self, ForecastResponse};
use cityweather::WeatherIcon;

/// Unix timestamp for a local date at a mid-day hour, so the sample lands
/// on that local calendar day regardless of the machine's timezone.
fn dt(date: NaiveDate, hour: u32) -> i64 {
    Local
        .from_local_datetime(&date.and_hms_opt(hour, 0, 0).unwrap())
        .single()
        .unwrap()
        .timestamp()
}

fn entry(ts: i64, temp: f64, condition: &str) -> String {
    format!(
        r#"{{"dt": {ts},
            "main": {{"temp": {temp}, "temp_min": {}, "temp_max": {}, "humidity": 60}},
            "weather": [{{"main": "{condition}", "description": ""}}],
            "wind": {{"speed": 3.1}}}}"#,
        temp - 1.0,
        temp + 1.0,
    )
}

fn payload(entries: &[String]) -> ForecastResponse {
    let json = format!(r#"{{"list": [{}]}}"#, entries.join(","));
    serde_json::from_str(&json).unwrap()
}

#[test]
fn feed_aggregates_into_daily_summaries() {
    let today = Local::now().date_naive();
    let day1 = today + Duration::days(1);
    let day2 = today + Duration::days(2);

    let entries = vec![
        // Partial current-day bucket that must not leak into the summaries
        entry(dt(today, 12), 280.0, "Snow"),
        entry(dt(day1, 6), 300.0, "Rain"),
        entry(dt(day1, 9), 290.0, "Clouds"),
        entry(dt(day1, 12), 295.0, "Rain"),
        entry(dt(day2, 6), 285.0, "Clouds"),
        entry(dt(day2, 9), 285.0, "Rain"),
    ];

    let samples = openweather::to_samples(payload(&entries));
    assert_eq!(samples.len(), 6);

    let summaries = DailyAggregator::default().aggregate_as_of(&samples, today);
    assert_eq!(summaries.len(), 2);

    let first = &summaries[0];
    assert_eq!(first.date, day1);
    assert_eq!(first.min_temp_c, 17); // 290K
    assert_eq!(first.max_temp_c, 27); // 300K
    assert_eq!(first.avg_temp_c, 22); // mean 295K
    assert_eq!(first.dominant_condition, "Rain");

    // 2-2 tie between Clouds and Rain resolves to the first label seen
    let second = &summaries[1];
    assert_eq!(second.date, day2);
    assert_eq!(second.dominant_condition, "Clouds");
}

#[test]
fn summaries_carry_classifiable_conditions() {
    let today = Local::now().date_naive();
    let day = today + Duration::days(1);

    let entries = vec![
        entry(dt(day, 6), 293.0, "Thunderstorm"),
        entry(dt(day, 9), 293.0, "Thunderstorm"),
    ];

    let samples = openweather::to_samples(payload(&entries));
    let summaries = DailyAggregator::default().aggregate_as_of(&samples, today);

    // Labels with no icon keyword fall through to the cloud category
    assert_eq!(
        WeatherIcon::classify(&summaries[0].dominant_condition),
        WeatherIcon::Cloud
    );
}

#[test]
fn all_samples_on_today_yield_no_summaries() {
    let today = Local::now().date_naive();
    let entries: Vec<String> = (0..8)
        .map(|i| entry(dt(today, 6 + i * 2), 293.0, "Clear"))
        .collect();

    let samples = openweather::to_samples(payload(&entries));
    let summaries = DailyAggregator::default().aggregate_as_of(&samples, today);
    assert!(summaries.is_empty());
}

#[test]
fn empty_feed_yields_empty_summaries() {
    let samples = openweather::to_samples(payload(&[]));
    let summaries =
        DailyAggregator::default().aggregate_as_of(&samples, Local::now().date_naive());
    assert!(summaries.is_empty());
}

#[test]
fn aggregation_is_deterministic_over_identical_input() {
    let today = Local::now().date_naive();
    let day = today + Duration::days(1);
    let entries = vec![
        entry(dt(day, 6), 291.4, "Rain"),
        entry(dt(day, 9), 296.2, "Clouds"),
    ];

    let first = DailyAggregator::default()
        .aggregate_as_of(&openweather::to_samples(payload(&entries)), today);
    let second = DailyAggregator::default()
        .aggregate_as_of(&openweather::to_samples(payload(&entries)), today);
    assert_eq!(first, second);
}
