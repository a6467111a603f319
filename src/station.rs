//! Nearest-station selection
//!
//! Given a target coordinate and a candidate list, compute the great-circle
//! distance to every candidate, sort ascending, and accept the closest one
//! only if it falls within the radius. Sorting happens before the threshold
//! check, and the sort is stable: among equal distances the earlier candidate
//! in the original list wins.

use crate::config::CustomStation;
use crate::error::{Error, Result};
use crate::models::{Coordinate, StationCandidate};
use tracing::debug;

/// Radius for user-defined stations
pub const CUSTOM_STATION_RADIUS_M: f64 = 10_000.0;
/// Radius for vendor national-network sitelists
pub const NETWORK_STATION_RADIUS_M: f64 = 100_000.0;

/// Select the closest candidate within `max_radius_m` of `target`
///
/// Returns the candidate and its distance in meters, or [`Error::NotFound`]
/// when every candidate lies beyond the radius (an out-of-range station is
/// worse than none).
pub fn nearest(
    target: &Coordinate,
    candidates: &[StationCandidate],
    max_radius_m: f64,
) -> Result<(StationCandidate, f64)> {
    if candidates.is_empty() {
        return Err(Error::not_found("no station candidates"));
    }

    let mut ranked: Vec<(f64, &StationCandidate)> = candidates
        .iter()
        .map(|candidate| (target.distance_m(&candidate.coordinate), candidate))
        .collect();
    // Stable sort: original list order breaks distance ties
    ranked.sort_by(|a, b| a.0.total_cmp(&b.0));

    let (distance, closest) = ranked[0];
    if distance > max_radius_m {
        debug!(
            "closest station '{}' at {distance:.0} m exceeds radius {max_radius_m:.0} m",
            closest.id
        );
        return Err(Error::not_found(format!(
            "closest station '{}' is {distance:.0} m away, beyond the {max_radius_m:.0} m radius",
            closest.id
        )));
    }

    debug!("selected station '{}' at {distance:.0} m", closest.id);
    Ok((closest.clone(), distance))
}

/// User-defined stations from the configuration as search candidates
#[must_use]
pub fn custom_candidates(stations: &[CustomStation]) -> Vec<StationCandidate> {
    stations
        .iter()
        .filter_map(|station| {
            let coordinate = Coordinate::new(station.latitude, station.longitude).ok()?;
            let mut candidate = StationCandidate::new(station.id.clone(), coordinate);
            candidate.name = station.name.clone();
            Some(candidate)
        })
        .collect()
}
