//! Condition-label to icon classification

use serde::{Deserialize, Serialize};
use std::fmt;

/// Icon category a free-text condition label maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeatherIcon {
    Clear,
    Snow,
    Rain,
    Cloud,
}

impl WeatherIcon {
    /// Classify a condition label into an icon category.
    ///
    /// Keyword precedence on the lowercased label: sun/clear, then snow,
    /// then rain/drizzle; anything else (including empty input) is cloud.
    #[must_use]
    pub fn classify(condition: &str) -> Self {
        let condition = condition.to_lowercase();

        if condition.contains("sun") || condition.contains("clear") {
            Self::Clear
        } else if condition.contains("snow") {
            Self::Snow
        } else if condition.contains("rain") || condition.contains("drizzle") {
            Self::Rain
        } else {
            Self::Cloud
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Clear => "clear",
            Self::Snow => "snow",
            Self::Rain => "rain",
            Self::Cloud => "cloud",
        }
    }
}

impl fmt::Display for WeatherIcon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
