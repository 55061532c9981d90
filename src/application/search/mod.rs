//! Station search and per-point hourly availability

pub mod geo;
pub mod station_search;

pub use geo::haversine_km;
pub use station_search::{HourAvailability, SearchQuery, SearchSettings, StationMatch, StationSearchService};
