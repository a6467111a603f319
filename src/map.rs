//! Static-map URL construction
//!
//! No fetch happens here: the capability produces a URL the caller embeds.
//! Credentials are still checked up front so a missing key surfaces as the
//! usual error instead of a broken image.

use crate::config::WhereaboutsConfig;
use crate::error::{Error, Result};
use crate::models::Coordinate;

/// Rendering parameters for a static map
#[derive(Debug, Clone)]
pub struct MapParams {
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Tile zoom level
    pub zoom: u8,
    /// Drop a marker on the coordinate
    pub marker: bool,
}

impl Default for MapParams {
    fn default() -> Self {
        Self {
            width: 600,
            height: 300,
            zoom: 14,
            marker: true,
        }
    }
}

pub struct MapVendor {
    pub slug: &'static str,
    pub name: &'static str,
    pub requires_key: bool,
    pub build: fn(Option<&str>, &Coordinate, &MapParams) -> String,
}

fn osm_build(_key: Option<&str>, coordinate: &Coordinate, params: &MapParams) -> String {
    let mut url = format!(
        "https://staticmap.openstreetmap.de/staticmap.php?center={},{}&zoom={}&size={}x{}",
        coordinate.latitude, coordinate.longitude, params.zoom, params.width, params.height
    );
    if params.marker {
        url.push_str(&format!(
            "&markers={},{},red-pushpin",
            coordinate.latitude, coordinate.longitude
        ));
    }
    url
}

fn mapbox_build(key: Option<&str>, coordinate: &Coordinate, params: &MapParams) -> String {
    let overlay = if params.marker {
        format!(
            "pin-s+f74e4e({},{})/",
            coordinate.longitude, coordinate.latitude
        )
    } else {
        String::new()
    };
    format!(
        "https://api.mapbox.com/styles/v1/mapbox/streets-v12/static/{overlay}{},{},{}/{}x{}?access_token={}",
        coordinate.longitude,
        coordinate.latitude,
        params.zoom,
        params.width,
        params.height,
        key.unwrap_or("")
    )
}

fn google_build(key: Option<&str>, coordinate: &Coordinate, params: &MapParams) -> String {
    let mut url = format!(
        "https://maps.googleapis.com/maps/api/staticmap?center={},{}&zoom={}&size={}x{}",
        coordinate.latitude, coordinate.longitude, params.zoom, params.width, params.height
    );
    if params.marker {
        url.push_str(&format!(
            "&markers={}",
            urlencoding::encode(&format!(
                "color:red|{},{}",
                coordinate.latitude, coordinate.longitude
            ))
        ));
    }
    url.push_str(&format!("&key={}", key.unwrap_or("")));
    url
}

/// Every static-map vendor the crate ships
pub static MAP_VENDORS: &[MapVendor] = &[
    MapVendor {
        slug: "osm",
        name: "OpenStreetMap static map",
        requires_key: false,
        build: osm_build,
    },
    MapVendor {
        slug: "mapbox",
        name: "Mapbox Static Images",
        requires_key: true,
        build: mapbox_build,
    },
    MapVendor {
        slug: "google",
        name: "Google Static Maps",
        requires_key: true,
        build: google_build,
    },
];

/// Look up a vendor record by slug
#[must_use]
pub fn vendor_by_slug(slug: &str) -> Option<&'static MapVendor> {
    MAP_VENDORS.iter().find(|vendor| vendor.slug == slug)
}

pub struct MapProvider {
    vendor: &'static MapVendor,
    api_key: Option<String>,
}

impl MapProvider {
    pub fn new(vendor: &'static MapVendor, config: &WhereaboutsConfig) -> Self {
        Self {
            vendor,
            api_key: config.api_key(vendor.slug).map(str::to_string),
        }
    }

    #[must_use]
    pub fn slug(&self) -> &'static str {
        self.vendor.slug
    }

    /// Build the static-map image URL for a coordinate
    pub fn static_map_url(
        &self,
        coordinate: &Coordinate,
        params: &MapParams,
    ) -> Result<String> {
        if self.vendor.requires_key && self.api_key.is_none() {
            return Err(Error::missing_credentials(self.vendor.slug));
        }
        Ok((self.vendor.build)(
            self.api_key.as_deref(),
            coordinate,
            params,
        ))
    }
}
