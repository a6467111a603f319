//! `whereabouts` - geolocation and weather provider normalization
//!
//! This library converts heterogeneous vendor address and weather payloads
//! into one canonical schema: ordered fallback field chains tolerate vendor
//! naming differences, static reference tables resolve country and region
//! codes, a nearest-station resolver picks the observing station by
//! great-circle distance, and a TTL-bounded cache keeps identical lookups
//! off the wire.

pub mod cache;
pub mod config;
pub mod elevation;
pub mod error;
pub mod fallback;
pub mod geocode;
pub mod http;
pub mod map;
pub mod models;
pub mod refdata;
pub mod registry;
pub mod station;
pub mod units;
pub mod weather;

// Re-export core types for public API
pub use cache::Cache;
pub use config::WhereaboutsConfig;
pub use elevation::ElevationProvider;
pub use error::Error;
pub use geocode::GeocodeProvider;
pub use http::{Fetch, HttpFetcher};
pub use map::{MapParams, MapProvider};
pub use models::{
    CanonicalAddress, CanonicalConditions, Coordinate, StationCandidate, Wind,
};
pub use registry::{Capability, Registry};
pub use weather::WeatherProvider;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, Error>;
