//! Weather station candidate model

use crate::models::Coordinate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A fixed-location observation source offered by a vendor sitelist or
/// configured by the user
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StationCandidate {
    /// Vendor- or user-assigned identifier
    pub id: String,
    pub coordinate: Coordinate,
    /// Station name, when the source provides one
    pub name: Option<String>,
    /// Vendor-specific metadata carried through untouched
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

impl StationCandidate {
    /// Create a bare candidate from an id and a coordinate
    #[must_use]
    pub fn new(id: impl Into<String>, coordinate: Coordinate) -> Self {
        Self {
            id: id.into(),
            coordinate,
            name: None,
            metadata: None,
        }
    }
}
