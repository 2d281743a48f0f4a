//! Country data models: the provider's raw schema and the canonical record.
//!
//! Raw models use `#[serde(default)]` for optional fields to match the
//! provider's loosely populated payloads. Maps deserialize into `BTreeMap` so
//! derived sequences have a deterministic order.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Raw country payload from the REST Countries v3.1 API.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawCountry {
    /// Nested name object (common and official).
    #[serde(default)]
    pub name: RawName,

    /// ISO 3166-1 alpha-2 code.
    #[serde(default)]
    pub cca2: Option<String>,

    /// ISO 3166-1 alpha-3 code.
    #[serde(default)]
    pub cca3: Option<String>,

    /// Flag image URLs.
    #[serde(default)]
    pub flags: Option<RawFlags>,

    /// Population count.
    #[serde(default)]
    pub population: Option<u64>,

    /// Continent-level region.
    #[serde(default)]
    pub region: Option<String>,

    /// Subregion.
    #[serde(default)]
    pub subregion: Option<String>,

    /// Capital cities (usually one).
    #[serde(default)]
    pub capital: Vec<String>,

    /// Language code to language name.
    #[serde(default)]
    pub languages: BTreeMap<String, String>,

    /// Currency code to currency details.
    #[serde(default)]
    pub currencies: BTreeMap<String, RawCurrency>,

    /// Map service links.
    #[serde(default)]
    pub maps: Option<RawMaps>,

    /// UTC offset strings.
    #[serde(default)]
    pub timezones: Vec<String>,

    /// `[latitude, longitude]` pair.
    #[serde(default)]
    pub latlng: Vec<f64>,
}

impl RawCountry {
    /// The common name, falling back to an empty string.
    #[must_use]
    pub fn common_name(&self) -> &str {
        &self.name.common
    }
}

/// Nested name object.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawName {
    /// Common name (e.g. "France").
    #[serde(default)]
    pub common: String,

    /// Official name (e.g. "French Republic").
    #[serde(default)]
    pub official: Option<String>,
}

/// Flag image URLs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawFlags {
    /// PNG flag URL.
    #[serde(default)]
    pub png: Option<String>,

    /// SVG flag URL.
    #[serde(default)]
    pub svg: Option<String>,
}

/// Currency details keyed by code in the raw payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawCurrency {
    /// Currency name.
    #[serde(default)]
    pub name: Option<String>,

    /// Currency symbol.
    #[serde(default)]
    pub symbol: Option<String>,
}

/// Map service links.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMaps {
    /// Google Maps URL.
    #[serde(default)]
    pub google_maps: Option<String>,

    /// OpenStreetMap URL.
    #[serde(default)]
    pub open_street_maps: Option<String>,
}

/// Canonical country record served to clients.
///
/// Decoupled from the provider's raw schema; fields absent on a given country
/// are omitted from the serialized object rather than emitted as null.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryRecord {
    /// Common name.
    pub name: String,

    /// Official name; falls back to the common name.
    pub official_name: String,

    /// ISO 3166-1 alpha-2 code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    /// ISO 3166-1 alpha-3 code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cca3: Option<String>,

    /// Flag image URL (PNG preferred).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flag_url: Option<String>,

    /// Population count.
    pub population: u64,

    /// Continent-level region.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    /// Subregion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subregion: Option<String>,

    /// Primary capital city.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capital: Option<String>,

    /// Language names, ordered by language code.
    #[serde(default)]
    pub languages: Vec<String>,

    /// Currencies, ordered by code.
    #[serde(default)]
    pub currencies: Vec<CurrencyInfo>,

    /// Map service links.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maps: Option<MapLinks>,

    /// UTC offset strings.
    #[serde(default)]
    pub timezones: Vec<String>,

    /// Geographic coordinates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
}

/// A currency on the canonical record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrencyInfo {
    /// Currency code (e.g. "EUR").
    pub code: String,

    /// Currency name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Currency symbol.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
}

/// Map service links on the canonical record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapLinks {
    /// Google Maps URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_maps: Option<String>,

    /// OpenStreetMap URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_street_maps: Option<String>,
}

/// Geographic coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude.
    pub lat: f64,

    /// Longitude.
    pub lng: f64,
}

/// One page of a filtered country listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResult {
    /// Total matches after filtering, across all pages.
    pub total: usize,

    /// Current page number (1-based).
    pub page: usize,

    /// Total number of pages at the current limit.
    pub total_pages: usize,

    /// Records on this page.
    pub data: Vec<CountryRecord>,
}
