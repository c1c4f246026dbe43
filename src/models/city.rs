//! City directory records and normalized catalog entries

use serde::{Deserialize, Deserializer, Serialize};

/// Raw place record as delivered by the city directory provider.
///
/// Every field is optional; the provider ships far more fields than the
/// service consumes, and the ones it does consume arrive with uneven quality.
/// Shape checking happens once here at the serde boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceRecord {
    /// Human-readable city name; records without one carry no identity
    #[serde(default)]
    pub city_name: Option<String>,
    /// ASCII-only variant of the city name, preferred for forecast queries
    #[serde(default)]
    pub city_ascii_name: Option<String>,
    /// State or province the place belongs to
    #[serde(default)]
    pub state: Option<String>,
    /// Provider-supplied ranking signal; a numeric-as-string in the wild,
    /// but some records carry a bare JSON number instead
    #[serde(default, deserialize_with = "popularity_as_string")]
    pub popularity: Option<String>,
}

/// Accept the popularity field as either a JSON string or a bare number.
///
/// The untagged branch only works for self-describing formats; the cache's
/// binary encoding round-trips the already-coerced string directly.
fn popularity_as_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    if !deserializer.is_human_readable() {
        return Option::<String>::deserialize(deserializer);
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        Text(String),
        Number(f64),
    }

    let raw: Option<StringOrNumber> = Option::deserialize(deserializer)?;
    Ok(raw.map(|value| match value {
        StringOrNumber::Text(text) => text,
        StringOrNumber::Number(number) => number.to_string(),
    }))
}

/// A de-duplicatable, display-ready catalog entry derived from a
/// [`PlaceRecord`]. Immutable once built; the catalog is recomputed from the
/// raw records on every fetch rather than mutated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedCity {
    /// Non-empty city name (records without one are dropped upstream)
    pub city_name: String,
    /// ASCII-only name variant, when the provider supplies one
    pub ascii_name: Option<String>,
    /// State or province, when the provider supplies one
    pub state: Option<String>,
    /// State-disambiguated label: `"{city_name}, {state}"` or the bare name
    pub display_name: String,
    /// Parsed ranking signal; absent or non-numeric values sort last
    pub popularity: Option<f64>,
}

impl NormalizedCity {
    /// Build a normalized entry from a raw record.
    ///
    /// Returns `None` for records without a usable `city_name`. Empty
    /// strings in optional fields are coerced to `None` here so no caller
    /// has to re-check them.
    pub fn from_record(record: PlaceRecord) -> Option<Self> {
        let city_name = non_empty(record.city_name)?;
        let ascii_name = non_empty(record.city_ascii_name);
        let state = non_empty(record.state);

        let display_name = match &state {
            Some(state) => format!("{city_name}, {state}"),
            None => city_name.clone(),
        };

        let popularity = record
            .popularity
            .as_deref()
            .and_then(|raw| raw.trim().parse::<f64>().ok())
            .filter(|value| value.is_finite());

        Some(Self {
            city_name,
            ascii_name,
            state,
            display_name,
            popularity,
        })
    }

    /// Name to use when querying the forecast provider.
    ///
    /// The ASCII variant travels better through provider lookups; fall back
    /// to the display city name when it is missing.
    #[must_use]
    pub fn query_name(&self) -> &str {
        self.ascii_name.as_deref().unwrap_or(&self.city_name)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: Option<&str>, state: Option<&str>) -> PlaceRecord {
        PlaceRecord {
            city_name: name.map(String::from),
            city_ascii_name: None,
            state: state.map(String::from),
            popularity: None,
        }
    }

    #[test]
    fn test_display_name_with_state() {
        let city = NormalizedCity::from_record(record(Some("Austin"), Some("TX"))).unwrap();
        assert_eq!(city.display_name, "Austin, TX");
    }

    #[test]
    fn test_display_name_without_state() {
        let city = NormalizedCity::from_record(record(Some("Austin"), None)).unwrap();
        assert_eq!(city.display_name, "Austin");

        // Empty state behaves like an absent one
        let city = NormalizedCity::from_record(record(Some("Austin"), Some(""))).unwrap();
        assert_eq!(city.display_name, "Austin");
        assert_eq!(city.state, None);
    }

    #[test]
    fn test_records_without_name_are_dropped() {
        assert!(NormalizedCity::from_record(record(None, Some("TX"))).is_none());
        assert!(NormalizedCity::from_record(record(Some(""), Some("TX"))).is_none());
    }

    #[test]
    fn test_popularity_parsing() {
        let mut raw = record(Some("Lima"), None);
        raw.popularity = Some("0.3654".to_string());
        let city = NormalizedCity::from_record(raw).unwrap();
        assert_eq!(city.popularity, Some(0.3654));

        let mut raw = record(Some("Lima"), None);
        raw.popularity = Some("not-a-number".to_string());
        let city = NormalizedCity::from_record(raw).unwrap();
        assert_eq!(city.popularity, None);

        // NaN would poison every popularity comparison downstream
        let mut raw = record(Some("Lima"), None);
        raw.popularity = Some("NaN".to_string());
        let city = NormalizedCity::from_record(raw).unwrap();
        assert_eq!(city.popularity, None);
    }

    #[test]
    fn test_query_name_prefers_ascii() {
        let mut raw = record(Some("Mérida"), None);
        raw.city_ascii_name = Some("Merida".to_string());
        let city = NormalizedCity::from_record(raw).unwrap();
        assert_eq!(city.query_name(), "Merida");

        let city = NormalizedCity::from_record(record(Some("Lima"), None)).unwrap();
        assert_eq!(city.query_name(), "Lima");
    }

    #[test]
    fn test_place_record_accepts_numeric_popularity() {
        let record: PlaceRecord =
            serde_json::from_str(r#"{"city_name": "Lima", "popularity": 0.25}"#).unwrap();
        assert_eq!(record.popularity, Some("0.25".to_string()));

        let record: PlaceRecord =
            serde_json::from_str(r#"{"city_name": "Lima", "popularity": "0.25"}"#).unwrap();
        assert_eq!(record.popularity, Some("0.25".to_string()));
    }
}
