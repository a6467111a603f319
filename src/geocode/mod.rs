//! Geocode capability: forward and reverse lookups
//!
//! A [`GeocodeProvider`] binds one vendor configuration to the fetch
//! collaborator, credentials, and the result cache. Normalization itself
//! lives in [`engine`]; vendor records live in [`vendors`].

pub mod engine;
pub mod vendors;

use crate::cache::{self, Cache};
use crate::config::WhereaboutsConfig;
use crate::error::{Error, Result};
use crate::http::Fetch;
use crate::models::{CanonicalAddress, Coordinate};
use engine::{fill_template, GeocodeVendor};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

pub struct GeocodeProvider {
    vendor: &'static GeocodeVendor,
    fetcher: Arc<dyn Fetch>,
    cache: Arc<Cache>,
    api_key: Option<String>,
    address_ttl: Duration,
    debug: bool,
}

impl GeocodeProvider {
    /// Bind a vendor to the collaborators it needs
    pub fn new(
        vendor: &'static GeocodeVendor,
        fetcher: Arc<dyn Fetch>,
        cache: Arc<Cache>,
        config: &WhereaboutsConfig,
    ) -> Self {
        Self {
            vendor,
            fetcher,
            cache,
            api_key: config.api_key(vendor.slug).map(str::to_string),
            address_ttl: Duration::from_secs(config.cache.address_ttl_seconds),
            debug: config.debug,
        }
    }

    #[must_use]
    pub fn slug(&self) -> &'static str {
        self.vendor.slug
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.vendor.name
    }

    /// Resolve a coordinate to a canonical address
    pub fn reverse_lookup(&self, coordinate: &Coordinate) -> Result<CanonicalAddress> {
        let key = self.require_key()?;
        let cache_key = cache::address_key(self.vendor.slug, coordinate);
        self.cache.get_or_fetch(&cache_key, self.address_ttl, || {
            info!(
                "reverse lookup via {} for {}",
                self.vendor.slug,
                coordinate.format()
            );
            let url = fill_template(
                self.vendor.reverse_endpoint,
                &[
                    ("lat", &coordinate.latitude.to_string()),
                    ("lon", &coordinate.longitude.to_string()),
                    ("key", key.as_deref().unwrap_or("")),
                ],
            );
            let mut params = (self.vendor.reverse_params)(coordinate);
            self.append_key(&mut params, key.as_deref());
            let raw = self.fetcher.fetch_json(&url, &params, &[])?;
            engine::normalize(self.vendor, &raw, Some(coordinate), self.debug)
        })
    }

    /// Resolve a free-form query (place name, address, postal code) to a
    /// canonical address
    pub fn geocode(&self, query: &str) -> Result<CanonicalAddress> {
        let query = query.trim();
        if query.is_empty() {
            return Err(Error::no_results("empty query"));
        }
        let key = self.require_key()?;
        let cache_key = format!("geocode:{}:{}", self.vendor.slug, query.to_lowercase());
        self.cache.get_or_fetch(&cache_key, self.address_ttl, || {
            info!("forward geocode via {} for '{query}'", self.vendor.slug);
            let url = fill_template(
                self.vendor.forward_endpoint,
                &[
                    ("query", &urlencoding::encode(query).into_owned()),
                    ("key", key.as_deref().unwrap_or("")),
                ],
            );
            let mut params = (self.vendor.forward_params)(query);
            self.append_key(&mut params, key.as_deref());
            let raw = self.fetcher.fetch_json(&url, &params, &[])?;
            engine::normalize(self.vendor, &raw, None, self.debug)
        })
    }

    /// Credential check, short-circuiting before any network call
    fn require_key(&self) -> Result<Option<String>> {
        if self.vendor.requires_key && self.api_key.is_none() {
            return Err(Error::missing_credentials(self.vendor.slug));
        }
        Ok(self.api_key.clone())
    }

    fn append_key(&self, params: &mut Vec<(&'static str, String)>, key: Option<&str>) {
        if let (Some(param), Some(key)) = (self.vendor.key_param, key) {
            params.push((param, key.to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::stub::StubFetcher;
    use serde_json::json;

    fn provider_for(
        slug: &str,
        fetcher: Arc<StubFetcher>,
        config: &WhereaboutsConfig,
    ) -> GeocodeProvider {
        GeocodeProvider::new(
            vendors::vendor_by_slug(slug).unwrap(),
            fetcher,
            Arc::new(Cache::new()),
            config,
        )
    }

    fn ottawa_payload() -> serde_json::Value {
        json!({
            "lat": "45.01",
            "lon": "-75.44",
            "display_name": "",
            "address": {
                "city": "Ottawa",
                "state": "Ontario",
                "country": "Canada",
                "country_code": "ca",
                "postcode": "K1A 0A9"
            }
        })
    }

    #[test]
    fn test_reverse_lookup_normalizes_ottawa() {
        let fetcher = Arc::new(StubFetcher::new().route("nominatim", ottawa_payload()));
        let config = WhereaboutsConfig::default();
        let provider = provider_for("nominatim", fetcher, &config);

        let coordinate = Coordinate::new(45.01, -75.44).unwrap();
        let address = provider.reverse_lookup(&coordinate).unwrap();

        assert_eq!(address.country_code.as_deref(), Some("CA"));
        assert_eq!(address.region.as_deref(), Some("Ontario"));
        assert_eq!(address.region_code.as_deref(), Some("ON"));
        assert_eq!(address.locality.as_deref(), Some("Ottawa"));
        assert!(address.display_name.contains("Ottawa"));
        assert!(address.display_name.contains("Ontario"));
        // Raw payload stays out of the record unless debug is set
        assert!(address.raw.is_none());
    }

    #[test]
    fn test_reverse_lookup_is_cached() {
        let fetcher = Arc::new(StubFetcher::new().route("nominatim", ottawa_payload()));
        let config = WhereaboutsConfig::default();
        let provider = provider_for("nominatim", fetcher.clone(), &config);

        let coordinate = Coordinate::new(45.01, -75.44).unwrap();
        provider.reverse_lookup(&coordinate).unwrap();
        provider.reverse_lookup(&coordinate).unwrap();
        // Nearby coordinate rounds to the same key at 4 decimal places
        let nearby = Coordinate::new(45.010_04, -75.440_02).unwrap();
        provider.reverse_lookup(&nearby).unwrap();

        assert_eq!(fetcher.call_count(), 1);
    }

    #[test]
    fn test_missing_credentials_short_circuits() {
        // No API key configured; the stub would fail the test if contacted
        let fetcher = Arc::new(StubFetcher::new());
        let config = WhereaboutsConfig::default();
        let provider = provider_for("locationiq", fetcher, &config);

        let coordinate = Coordinate::new(45.0, -75.0).unwrap();
        let result = provider.reverse_lookup(&coordinate);
        assert!(matches!(result, Err(Error::MissingCredentials { .. })));
    }

    #[test]
    fn test_key_param_is_appended() {
        let fetcher = Arc::new(StubFetcher::new().route("locationiq", ottawa_payload()));
        let mut config = WhereaboutsConfig::default();
        config
            .providers
            .api_keys
            .insert("locationiq".to_string(), "sekrit".to_string());
        let provider = provider_for("locationiq", fetcher.clone(), &config);

        let coordinate = Coordinate::new(45.01, -75.44).unwrap();
        provider.reverse_lookup(&coordinate).unwrap();

        let calls = fetcher.calls.lock().unwrap();
        assert_eq!(calls[0].1.get("key").map(String::as_str), Some("sekrit"));
    }

    #[test]
    fn test_no_results_propagates() {
        let fetcher =
            Arc::new(StubFetcher::new().route("nominatim", json!({"error": "Unable to geocode"})));
        let config = WhereaboutsConfig::default();
        let provider = provider_for("nominatim", fetcher, &config);

        let coordinate = Coordinate::new(0.0, 0.0).unwrap();
        let result = provider.reverse_lookup(&coordinate);
        assert!(matches!(result, Err(Error::NoResults(_))));
    }

    #[test]
    fn test_empty_query_rejected_before_fetch() {
        let fetcher = Arc::new(StubFetcher::new());
        let config = WhereaboutsConfig::default();
        let provider = provider_for("nominatim", fetcher, &config);
        let result = provider.geocode("   ");
        assert!(matches!(result, Err(Error::NoResults(_))));
    }

    #[test]
    fn test_forward_geocode_google_style() {
        let payload = json!({
            "status": "OK",
            "results": [{
                "address_components": [
                    {"long_name": "Ottawa", "short_name": "Ottawa", "types": ["locality"]},
                    {"long_name": "Ontario", "short_name": "ON", "types": ["administrative_area_level_1"]},
                    {"long_name": "Canada", "short_name": "CA", "types": ["country"]}
                ],
                "formatted_address": "Ottawa, ON, Canada",
                "geometry": {"location": {"lat": 45.4215, "lng": -75.6972}}
            }]
        });
        let fetcher = Arc::new(StubFetcher::new().route("maps.googleapis.com", payload));
        let mut config = WhereaboutsConfig::default();
        config
            .providers
            .api_keys
            .insert("google".to_string(), "sekrit".to_string());
        let provider = provider_for("google", fetcher, &config);

        let address = provider.geocode("Ottawa").unwrap();
        assert_eq!(address.country_code.as_deref(), Some("CA"));
        assert_eq!(address.region_code.as_deref(), Some("ON"));
        assert_eq!(address.latitude, Some(45.4215));
        assert_eq!(address.display_name, "Ottawa, ON, Canada");
    }
}
