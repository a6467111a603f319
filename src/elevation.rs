//! Elevation capability
//!
//! Small vendor set returning meters above sea level for a coordinate.
//! Results are effectively static, so they share the address cache TTL.

use crate::cache::{Cache, KEY_PRECISION};
use crate::config::WhereaboutsConfig;
use crate::error::{Error, Result};
use crate::fallback::dig_f64;
use crate::http::Fetch;
use crate::models::Coordinate;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// SRTM sentinel for ocean or missing tiles
const GEONAMES_NO_DATA: f64 = -32768.0;

pub struct ElevationVendor {
    pub slug: &'static str,
    pub name: &'static str,
    pub requires_key: bool,
    pub lookup: fn(&dyn Fetch, Option<&str>, &Coordinate) -> Result<f64>,
}

fn openelevation_lookup(
    fetcher: &dyn Fetch,
    _key: Option<&str>,
    coordinate: &Coordinate,
) -> Result<f64> {
    let raw = fetcher.fetch_json(
        "https://api.open-elevation.com/api/v1/lookup",
        &[(
            "locations",
            format!("{},{}", coordinate.latitude, coordinate.longitude),
        )],
        &[],
    )?;
    dig_f64(&raw, &["results", "0", "elevation"])
        .ok_or_else(|| Error::malformed("missing 'results[0].elevation'"))
}

fn geonames_lookup(
    fetcher: &dyn Fetch,
    key: Option<&str>,
    coordinate: &Coordinate,
) -> Result<f64> {
    let username = key.ok_or_else(|| Error::missing_credentials("geonames"))?;
    let raw = fetcher.fetch_json(
        "https://secure.geonames.org/srtm3JSON",
        &[
            ("lat", coordinate.latitude.to_string()),
            ("lng", coordinate.longitude.to_string()),
            ("username", username.to_string()),
        ],
        &[],
    )?;
    if let Some(status) = raw.get("status") {
        let code = dig_f64(status, &["value"]).unwrap_or(0.0) as u16;
        let message = status
            .get("message")
            .and_then(serde_json::Value::as_str)
            .unwrap_or("unknown");
        return Err(Error::upstream(code, message));
    }
    let elevation = dig_f64(&raw, &["srtm3"])
        .ok_or_else(|| Error::malformed("missing 'srtm3' value"))?;
    if elevation == GEONAMES_NO_DATA {
        return Err(Error::no_results("no SRTM data for this coordinate"));
    }
    Ok(elevation)
}

/// Every elevation vendor the crate ships
pub static ELEVATION_VENDORS: &[ElevationVendor] = &[
    ElevationVendor {
        slug: "openelevation",
        name: "Open-Elevation",
        requires_key: false,
        lookup: openelevation_lookup,
    },
    ElevationVendor {
        slug: "geonames",
        name: "GeoNames SRTM3",
        requires_key: true,
        lookup: geonames_lookup,
    },
];

/// Look up a vendor record by slug
#[must_use]
pub fn vendor_by_slug(slug: &str) -> Option<&'static ElevationVendor> {
    ELEVATION_VENDORS.iter().find(|vendor| vendor.slug == slug)
}

pub struct ElevationProvider {
    vendor: &'static ElevationVendor,
    fetcher: Arc<dyn Fetch>,
    cache: Arc<Cache>,
    api_key: Option<String>,
    ttl: Duration,
}

impl ElevationProvider {
    pub fn new(
        vendor: &'static ElevationVendor,
        fetcher: Arc<dyn Fetch>,
        cache: Arc<Cache>,
        config: &WhereaboutsConfig,
    ) -> Self {
        Self {
            vendor,
            fetcher,
            cache,
            api_key: config.api_key(vendor.slug).map(str::to_string),
            ttl: Duration::from_secs(config.cache.address_ttl_seconds),
        }
    }

    #[must_use]
    pub fn slug(&self) -> &'static str {
        self.vendor.slug
    }

    /// Elevation in meters at the coordinate
    pub fn elevation(&self, coordinate: &Coordinate) -> Result<f64> {
        if self.vendor.requires_key && self.api_key.is_none() {
            return Err(Error::missing_credentials(self.vendor.slug));
        }
        let (lat, lon) = coordinate.rounded(KEY_PRECISION);
        let cache_key = format!("elevation:{}:{lat:.4}:{lon:.4}", self.vendor.slug);
        self.cache.get_or_fetch(&cache_key, self.ttl, || {
            info!(
                "elevation via {} for {}",
                self.vendor.slug,
                coordinate.format()
            );
            (self.vendor.lookup)(
                self.fetcher.as_ref(),
                self.api_key.as_deref(),
                coordinate,
            )
        })
    }
}
