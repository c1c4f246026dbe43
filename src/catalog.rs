//! City catalog operations: normalization, lookup and top-N selection
//!
//! Everything here is a pure transform over already-fetched directory data.
//! Malformed records are filtered rather than rejected wholesale, and a
//! missed lookup is an ordinary `None`, never an error.

use indexmap::IndexMap;
use tracing::debug;

use crate::models::{NormalizedCity, PlaceRecord};

/// Normalize a raw place list into display-ready catalog entries.
///
/// Records without a `city_name` are dropped; input order is preserved and
/// no deduplication happens here. Two places can legitimately share a
/// `city_name` while differing in `state`, so collapsing same-named entries
/// is deferred to [`select_top`].
#[must_use]
pub fn normalize(records: Vec<PlaceRecord>) -> Vec<NormalizedCity> {
    let total = records.len();
    let catalog: Vec<NormalizedCity> = records
        .into_iter()
        .filter_map(NormalizedCity::from_record)
        .collect();

    debug!(
        "Normalized {} of {} directory records into catalog entries",
        catalog.len(),
        total
    );

    catalog
}

/// Look up a catalog entry by name, case-insensitively.
///
/// Matches on `city_name` first; only when no entry matches does a second
/// pass consider `ascii_name`. The first match in catalog order wins; there
/// is no scoring.
#[must_use]
pub fn resolve<'a>(catalog: &'a [NormalizedCity], query: &str) -> Option<&'a NormalizedCity> {
    let query = query.to_lowercase();

    catalog
        .iter()
        .find(|city| city.city_name.to_lowercase() == query)
        .or_else(|| {
            catalog.iter().find(|city| {
                city.ascii_name
                    .as_deref()
                    .is_some_and(|ascii| ascii.to_lowercase() == query)
            })
        })
}

/// Select the most popular cities from the catalog, one per display name.
///
/// Entries are grouped by `display_name` so that, say, two same-named
/// cities in different states each stay in the running, while true
/// duplicates collapse to their most popular representative. A group only
/// produces a candidate when its best entry carries a numeric popularity;
/// entries without one always lose against any ranked entry. Survivors are
/// ordered by popularity descending and truncated to `limit` — fewer
/// available candidates than `limit` is not an error.
#[must_use]
pub fn select_top(catalog: &[NormalizedCity], limit: usize) -> Vec<NormalizedCity> {
    let mut groups: IndexMap<&str, &NormalizedCity> = IndexMap::new();

    for city in catalog {
        groups
            .entry(city.display_name.as_str())
            .and_modify(|best| {
                // Strict comparison keeps the first-encountered entry on ties
                if popularity_rank(city) > popularity_rank(best) {
                    *best = city;
                }
            })
            .or_insert(city);
    }

    let mut candidates: Vec<&NormalizedCity> = groups
        .into_values()
        .filter(|city| city.popularity.is_some())
        .collect();

    candidates.sort_by(|a, b| popularity_rank(b).total_cmp(&popularity_rank(a)));
    candidates.truncate(limit);

    candidates.into_iter().cloned().collect()
}

/// Sort key for popularity: absent values rank below every real value.
fn popularity_rank(city: &NormalizedCity) -> f64 {
    city.popularity.unwrap_or(f64::NEG_INFINITY)
}
