//! Daily aggregation of interval forecast samples
//!
//! Collapses the provider's ~3-hour interval feed into one summary per local
//! calendar day. Aggregation is a pure transform: the full sample sequence
//! for a city must be in hand before calling, and identical input always
//! yields identical output.

use chrono::{Local, NaiveDate};
use indexmap::IndexMap;

use crate::models::{DailySummary, ForecastSample};

/// Groups interval samples by local calendar day and summarizes each day.
#[derive(Debug, Clone)]
pub struct DailyAggregator {
    /// Skip samples on the current local day. The provider's first bucket
    /// is usually a partial reading for today and would skew the summary.
    pub exclude_today: bool,
    /// Upper bound on the number of days returned
    pub max_days: usize,
}

impl Default for DailyAggregator {
    fn default() -> Self {
        Self {
            exclude_today: true,
            max_days: 7,
        }
    }
}

struct DayBucket {
    temps: Vec<f64>,
    condition_counts: IndexMap<String, u32>,
}

impl DailyAggregator {
    /// Aggregate samples into per-day summaries, relative to the current
    /// local date.
    #[must_use]
    pub fn aggregate(&self, samples: &[ForecastSample]) -> Vec<DailySummary> {
        self.aggregate_as_of(samples, Local::now().date_naive())
    }

    /// Aggregate samples relative to an explicit "today".
    ///
    /// Days appear in first-encounter order, which for a timestamp-ascending
    /// feed is chronological order. An empty sample sequence yields an empty
    /// summary sequence.
    #[must_use]
    pub fn aggregate_as_of(&self, samples: &[ForecastSample], today: NaiveDate) -> Vec<DailySummary> {
        let mut days: IndexMap<NaiveDate, DayBucket> = IndexMap::new();

        for sample in samples {
            let day = sample.timestamp.with_timezone(&Local).date_naive();
            if self.exclude_today && day == today {
                continue;
            }

            let bucket = days.entry(day).or_insert_with(|| DayBucket {
                temps: Vec::new(),
                condition_counts: IndexMap::new(),
            });
            bucket.temps.push(sample.temperature);
            *bucket
                .condition_counts
                .entry(sample.condition.clone())
                .or_insert(0) += 1;
        }

        days.into_iter()
            .take(self.max_days)
            .map(|(date, bucket)| summarize_day(date, &bucket))
            .collect()
    }
}

fn summarize_day(date: NaiveDate, bucket: &DayBucket) -> DailySummary {
    let min = bucket.temps.iter().copied().fold(f64::INFINITY, f64::min);
    let max = bucket
        .temps
        .iter()
        .copied()
        .fold(f64::NEG_INFINITY, f64::max);
    // Mean in Kelvin first; rounding per-sample and then averaging would
    // drift by up to half a degree
    let mean = bucket.temps.iter().sum::<f64>() / bucket.temps.len() as f64;

    DailySummary {
        date,
        min_temp_c: ForecastSample::kelvin_to_celsius(min),
        max_temp_c: ForecastSample::kelvin_to_celsius(max),
        avg_temp_c: ForecastSample::kelvin_to_celsius(mean),
        dominant_condition: dominant_condition(&bucket.condition_counts),
    }
}

/// Highest-count condition label; on equal counts the label tallied first
/// wins.
fn dominant_condition(counts: &IndexMap<String, u32>) -> String {
    let mut dominant: Option<(&str, u32)> = None;
    for (label, &count) in counts {
        match dominant {
            Some((_, best)) if count <= best => {}
            _ => dominant = Some((label, count)),
        }
    }
    dominant.map(|(label, _)| label.to_string()).unwrap_or_default()
}
