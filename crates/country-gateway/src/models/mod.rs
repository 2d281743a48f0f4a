//! Data models for upstream payloads and the canonical client-facing shapes.

mod country;

pub use country::{
    Coordinates, CountryRecord, CurrencyInfo, MapLinks, PageResult, RawCountry, RawCurrency,
    RawFlags, RawMaps, RawName,
};
