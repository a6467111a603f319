//! Geographic coordinate model

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// A point on the globe, captured once per lookup
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Coordinate {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// Altitude above sea level in meters
    pub altitude: Option<f64>,
    /// Reported accuracy in meters
    pub accuracy: Option<f64>,
}

impl Coordinate {
    /// Create a coordinate, validating the latitude/longitude ranges
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(Error::config(format!(
                "Latitude must be between -90 and 90, got: {latitude}"
            )));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(Error::config(format!(
                "Longitude must be between -180 and 180, got: {longitude}"
            )));
        }
        Ok(Self {
            latitude,
            longitude,
            altitude: None,
            accuracy: None,
        })
    }

    /// Attach an altitude in meters
    #[must_use]
    pub fn with_altitude(mut self, altitude: f64) -> Self {
        self.altitude = Some(altitude);
        self
    }

    /// Great-circle distance to another coordinate, in meters
    #[must_use]
    pub fn distance_m(&self, other: &Coordinate) -> f64 {
        let km = haversine::distance(
            haversine::Location {
                latitude: self.latitude,
                longitude: self.longitude,
            },
            haversine::Location {
                latitude: other.latitude,
                longitude: other.longitude,
            },
            haversine::Units::Kilometers,
        );
        km * 1000.0
    }

    /// Round coordinates for cache key derivation
    #[must_use]
    pub fn rounded(&self, precision: u32) -> (f64, f64) {
        let multiplier = 10_f64.powi(i32::try_from(precision).unwrap_or(4));
        let lat = (self.latitude * multiplier).round() / multiplier;
        let lon = (self.longitude * multiplier).round() / multiplier;
        (lat, lon)
    }

    /// Format as "lat, lon" with four decimals
    #[must_use]
    pub fn format(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }
}
