//! Canonical address record produced by every geocode normalizer

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Normalized output of any geocode / reverse-geocode call
///
/// Every field except `display_name` is optional; a successful lookup always
/// carries a non-empty `display_name`, synthesized from the other fields when
/// the vendor did not supply one.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct CanonicalAddress {
    /// Venue or landmark name
    pub name: Option<String>,
    /// Full street address line (number + street, country ordering)
    pub street_address: Option<String>,
    /// Street name alone
    pub street: Option<String>,
    /// House number alone
    pub street_number: Option<String>,
    /// Apartment, suite, floor
    pub extended_address: Option<String>,
    /// City, town, or village
    pub locality: Option<String>,
    /// State / province / land name
    pub region: Option<String>,
    /// Subdivision code for the region, when resolvable
    pub region_code: Option<String>,
    /// Country name
    pub country_name: Option<String>,
    /// ISO 3166-1 alpha-2
    pub country_code: Option<String>,
    pub postal_code: Option<String>,
    /// Human-readable one-line form; never empty on success
    pub display_name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Meters above sea level
    pub altitude: Option<f64>,
    /// Vendor-provided page for the place
    pub url: Option<String>,
    /// Vendor-provided photo URL
    pub photo: Option<String>,
    /// IANA timezone name, e.g. "America/Toronto"
    pub timezone: Option<String>,
    /// UTC offset in seconds at the looked-up instant
    pub utc_offset_secs: Option<i32>,
    /// Raw vendor payload, populated only under the debug flag
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<Value>,
}

impl CanonicalAddress {
    /// Synthesize a display name by joining the non-empty parts with commas
    ///
    /// Used when the vendor gives none; contains at least the locality or
    /// country name whenever either is present.
    #[must_use]
    pub fn synthesize_display_name(&self) -> String {
        let parts = [
            self.name.as_deref(),
            self.street_address.as_deref(),
            self.locality.as_deref(),
            self.region.as_deref(),
            self.country_name.as_deref(),
        ];
        parts
            .iter()
            .filter_map(|p| *p)
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Fill `display_name` from the other fields if the vendor left it blank
    pub fn ensure_display_name(&mut self) {
        if self.display_name.is_empty() {
            self.display_name = self.synthesize_display_name();
        }
        if self.display_name.is_empty() {
            // Last resort: the coordinate itself
            if let (Some(lat), Some(lon)) = (self.latitude, self.longitude) {
                self.display_name = format!("{lat:.4}, {lon:.4}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthesized_display_name_skips_empty_parts() {
        let addr = CanonicalAddress {
            locality: Some("Ottawa".to_string()),
            region: Some("Ontario".to_string()),
            country_name: Some("Canada".to_string()),
            ..Default::default()
        };
        assert_eq!(addr.synthesize_display_name(), "Ottawa, Ontario, Canada");
    }

    #[test]
    fn test_synthesized_display_name_with_street() {
        let addr = CanonicalAddress {
            street_address: Some("24 Sussex Drive".to_string()),
            locality: Some("Ottawa".to_string()),
            country_name: Some("Canada".to_string()),
            ..Default::default()
        };
        assert_eq!(
            addr.synthesize_display_name(),
            "24 Sussex Drive, Ottawa, Canada"
        );
    }

    #[test]
    fn test_ensure_display_name_prefers_vendor_value() {
        let mut addr = CanonicalAddress {
            display_name: "Parliament Hill".to_string(),
            locality: Some("Ottawa".to_string()),
            ..Default::default()
        };
        addr.ensure_display_name();
        assert_eq!(addr.display_name, "Parliament Hill");
    }

    #[test]
    fn test_ensure_display_name_falls_back_to_coordinate() {
        let mut addr = CanonicalAddress {
            latitude: Some(45.4215),
            longitude: Some(-75.6972),
            ..Default::default()
        };
        addr.ensure_display_name();
        assert_eq!(addr.display_name, "45.4215, -75.6972");
    }

    #[test]
    fn test_display_name_contains_locality_or_country() {
        // Property from the normalizer contract: synthesized names carry at
        // least locality or country when either exists
        let addr = CanonicalAddress {
            country_name: Some("Canada".to_string()),
            ..Default::default()
        };
        let name = addr.synthesize_display_name();
        assert!(!name.is_empty());
        assert!(name.contains("Canada"));
    }
}
