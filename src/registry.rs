//! Provider registry and dispatch
//!
//! Builds every known vendor into a provider at construction time, sharing
//! one fetcher and one cache, and answers "the active provider for this
//! capability" / "the provider with this slug" so callers never hardcode a
//! vendor. Exactly one provider per capability is active, chosen by the
//! configuration.

use crate::cache::Cache;
use crate::config::WhereaboutsConfig;
use crate::elevation::{ElevationProvider, ELEVATION_VENDORS};
use crate::error::{Error, Result};
use crate::geocode::{vendors::GEOCODE_VENDORS, GeocodeProvider};
use crate::http::Fetch;
use crate::map::{MapProvider, MAP_VENDORS};
use crate::weather::{vendors::WEATHER_VENDORS, WeatherProvider};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// What a provider can do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    Geocode,
    Weather,
    Elevation,
    Map,
    /// Reserved; no venue vendor ships with the crate
    Venue,
}

pub struct Registry {
    geocode: Vec<GeocodeProvider>,
    weather: Vec<WeatherProvider>,
    elevation: Vec<ElevationProvider>,
    map: Vec<MapProvider>,
    active_geocode: String,
    active_weather: String,
    active_elevation: String,
    active_map: String,
    active_venue: Option<String>,
}

impl Registry {
    /// Register every known vendor, sharing one fetcher and one cache
    pub fn new(config: &WhereaboutsConfig, fetcher: Arc<dyn Fetch>) -> Self {
        let cache = Arc::new(Cache::new());

        let geocode = GEOCODE_VENDORS
            .iter()
            .map(|vendor| {
                GeocodeProvider::new(vendor, fetcher.clone(), cache.clone(), config)
            })
            .collect();
        let weather = WEATHER_VENDORS
            .iter()
            .map(|vendor| {
                WeatherProvider::new(vendor, fetcher.clone(), cache.clone(), config)
            })
            .collect();
        let elevation = ELEVATION_VENDORS
            .iter()
            .map(|vendor| {
                ElevationProvider::new(vendor, fetcher.clone(), cache.clone(), config)
            })
            .collect();
        let map = MAP_VENDORS
            .iter()
            .map(|vendor| MapProvider::new(vendor, config))
            .collect();

        Self {
            geocode,
            weather,
            elevation,
            map,
            active_geocode: config.providers.geocode.clone(),
            active_weather: config.providers.weather.clone(),
            active_elevation: config.providers.elevation.clone(),
            active_map: config.providers.map.clone(),
            active_venue: config.providers.venue.clone(),
        }
    }

    /// Slug of the active provider for a capability
    pub fn active_slug(&self, capability: Capability) -> Result<&str> {
        match capability {
            Capability::Geocode => Ok(&self.active_geocode),
            Capability::Weather => Ok(&self.active_weather),
            Capability::Elevation => Ok(&self.active_elevation),
            Capability::Map => Ok(&self.active_map),
            Capability::Venue => self
                .active_venue
                .as_deref()
                .ok_or_else(|| Error::not_found("no venue provider is registered")),
        }
    }

    /// All provider slugs registered for a capability
    #[must_use]
    pub fn slugs(&self, capability: Capability) -> Vec<&str> {
        match capability {
            Capability::Geocode => self.geocode.iter().map(GeocodeProvider::slug).collect(),
            Capability::Weather => self.weather.iter().map(WeatherProvider::slug).collect(),
            Capability::Elevation => {
                self.elevation.iter().map(ElevationProvider::slug).collect()
            }
            Capability::Map => self.map.iter().map(MapProvider::slug).collect(),
            Capability::Venue => Vec::new(),
        }
    }

    /// Active geocode provider
    pub fn geocode(&self) -> Result<&GeocodeProvider> {
        self.geocode_by_slug(&self.active_geocode)
    }

    /// Geocode provider by slug
    pub fn geocode_by_slug(&self, slug: &str) -> Result<&GeocodeProvider> {
        self.geocode
            .iter()
            .find(|provider| provider.slug() == slug)
            .ok_or_else(|| Error::not_found(format!("no geocode provider '{slug}'")))
    }

    /// Active weather provider
    pub fn weather(&self) -> Result<&WeatherProvider> {
        self.weather_by_slug(&self.active_weather)
    }

    /// Weather provider by slug
    pub fn weather_by_slug(&self, slug: &str) -> Result<&WeatherProvider> {
        self.weather
            .iter()
            .find(|provider| provider.slug() == slug)
            .ok_or_else(|| Error::not_found(format!("no weather provider '{slug}'")))
    }

    /// Active elevation provider
    pub fn elevation(&self) -> Result<&ElevationProvider> {
        self.elevation_by_slug(&self.active_elevation)
    }

    /// Elevation provider by slug
    pub fn elevation_by_slug(&self, slug: &str) -> Result<&ElevationProvider> {
        self.elevation
            .iter()
            .find(|provider| provider.slug() == slug)
            .ok_or_else(|| Error::not_found(format!("no elevation provider '{slug}'")))
    }

    /// Active static-map provider
    pub fn map(&self) -> Result<&MapProvider> {
        self.map_by_slug(&self.active_map)
    }

    /// Static-map provider by slug
    pub fn map_by_slug(&self, slug: &str) -> Result<&MapProvider> {
        self.map
            .iter()
            .find(|provider| provider.slug() == slug)
            .ok_or_else(|| Error::not_found(format!("no map provider '{slug}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::stub::StubFetcher;

    fn registry_with(config: &WhereaboutsConfig) -> Registry {
        Registry::new(config, Arc::new(StubFetcher::new()))
    }

    #[test]
    fn test_defaults_resolve_to_keyless_vendors() {
        let registry = registry_with(&WhereaboutsConfig::default());
        assert_eq!(registry.geocode().unwrap().slug(), "nominatim");
        assert_eq!(registry.weather().unwrap().slug(), "openmeteo");
        assert_eq!(registry.elevation().unwrap().slug(), "openelevation");
        assert_eq!(registry.map().unwrap().slug(), "osm");
    }

    #[test]
    fn test_active_follows_configuration() {
        let mut config = WhereaboutsConfig::default();
        config.providers.weather = "metno".to_string();
        let registry = registry_with(&config);
        assert_eq!(registry.weather().unwrap().slug(), "metno");
    }

    #[test]
    fn test_unknown_active_slug_is_not_found() {
        let mut config = WhereaboutsConfig::default();
        config.providers.weather = "weathertron".to_string();
        let registry = registry_with(&config);
        assert!(matches!(registry.weather(), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_by_slug_lookup() {
        let registry = registry_with(&WhereaboutsConfig::default());
        assert!(registry.geocode_by_slug("here").is_ok());
        assert!(registry.weather_by_slug("nws").is_ok());
        assert!(matches!(
            registry.geocode_by_slug("nope"),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_venue_capability_is_reserved() {
        let registry = registry_with(&WhereaboutsConfig::default());
        assert!(matches!(
            registry.active_slug(Capability::Venue),
            Err(Error::NotFound(_))
        ));
        assert!(registry.slugs(Capability::Venue).is_empty());
    }

    #[test]
    fn test_every_capability_has_registered_slugs() {
        let registry = registry_with(&WhereaboutsConfig::default());
        assert_eq!(registry.slugs(Capability::Geocode).len(), 8);
        assert_eq!(registry.slugs(Capability::Weather).len(), 7);
        assert_eq!(registry.slugs(Capability::Elevation).len(), 2);
        assert_eq!(registry.slugs(Capability::Map).len(), 3);
    }
}
