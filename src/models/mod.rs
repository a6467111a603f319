//! Core domain models
//!
//! - Location: validated geographic coordinates
//! - Address: the canonical record every geocode normalizer produces
//! - Conditions: the canonical weather snapshot, SI units throughout
//! - Station: a candidate observation source for nearest-station search

pub mod address;
pub mod conditions;
pub mod location;
pub mod station;

pub use address::CanonicalAddress;
pub use conditions::{
    condition_summary, wind_direction_to_cardinal, CanonicalConditions,
    ImperialConditions, Wind, CONDITION_UNKNOWN,
};
pub use location::Coordinate;
pub use station::StationCandidate;
