//! Response shaping: canonical formatting, filtering, pagination, and
//! field selection. Pure functions of input data and query parameters.

use serde_json::{Map, Value};

use crate::config::fields;
use crate::models::{
    Coordinates, CountryRecord, CurrencyInfo, MapLinks, PageResult, RawCountry,
};

/// Build the canonical record from a raw provider payload.
#[must_use]
pub fn format(raw: &RawCountry) -> CountryRecord {
    let coordinates = match raw.latlng.as_slice() {
        [lat, lng, ..] => Some(Coordinates { lat: *lat, lng: *lng }),
        _ => None,
    };

    let currencies = raw
        .currencies
        .iter()
        .map(|(code, c)| CurrencyInfo {
            code: code.clone(),
            name: c.name.clone(),
            symbol: c.symbol.clone(),
        })
        .collect();

    CountryRecord {
        name: raw.name.common.clone(),
        official_name: raw.name.official.clone().unwrap_or_else(|| raw.name.common.clone()),
        code: raw.cca2.clone(),
        cca3: raw.cca3.clone(),
        flag_url: raw
            .flags
            .as_ref()
            .and_then(|f| f.png.clone().or_else(|| f.svg.clone())),
        population: raw.population.unwrap_or(0),
        region: raw.region.clone(),
        subregion: raw.subregion.clone(),
        capital: raw.capital.first().cloned(),
        languages: raw.languages.values().cloned().collect(),
        currencies,
        maps: raw.maps.as_ref().map(|m| MapLinks {
            google_maps: m.google_maps.clone(),
            open_street_maps: m.open_street_maps.clone(),
        }),
        timezones: raw.timezones.clone(),
        coordinates,
    }
}

/// Filter by name and slice one page out of a record sequence.
///
/// A non-empty `search` keeps records whose common name contains the term,
/// case-insensitive. Non-positive `page`/`limit` clamp to 1; defaults are
/// applied by the caller. The slice is `[(page-1)*limit, page*limit)` over
/// the filtered sequence.
#[must_use]
pub fn paginate(
    records: Vec<CountryRecord>,
    page: i64,
    limit: i64,
    search: Option<&str>,
) -> PageResult {
    let page = page.max(1) as usize;
    let limit = limit.max(1) as usize;

    let filtered: Vec<CountryRecord> = match search {
        Some(term) if !term.is_empty() => {
            let term = term.to_lowercase();
            records.into_iter().filter(|r| r.name.to_lowercase().contains(&term)).collect()
        }
        _ => records,
    };

    let total = filtered.len();
    let total_pages = total.div_ceil(limit);
    let start = (page - 1).saturating_mul(limit);
    let data: Vec<CountryRecord> = filtered.into_iter().skip(start).take(limit).collect();

    PageResult { total, page, total_pages, data }
}

/// Project a record onto the requested top-level fields.
///
/// The result holds exactly the intersection of the requested names, the
/// selectable-field schema, and the keys present on the serialized record.
/// Unknown or absent names are dropped without error.
#[must_use]
pub fn select_fields(record: &CountryRecord, requested: &[&str]) -> Map<String, Value> {
    let Value::Object(full) = serde_json::to_value(record).unwrap_or_default() else {
        return Map::new();
    };

    let mut selected = Map::new();
    for name in requested {
        let name = name.trim();
        if !fields::is_selectable(name) {
            continue;
        }
        if let Some(value) = full.get(name) {
            selected.insert(name.to_string(), value.clone());
        }
    }
    selected
}
