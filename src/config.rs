//! Configuration management
//!
//! Loads settings from a TOML file and `WHEREABOUTS_`-prefixed environment
//! variables, applies defaults, and validates before use. The struct is
//! built once at startup and passed by reference; there is no global
//! mutable settings store.

use crate::error::Error;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WhereaboutsConfig {
    /// HTTP client limits
    #[serde(default)]
    pub http: HttpConfig,
    /// Active provider per capability plus vendor credentials
    #[serde(default)]
    pub providers: ProvidersConfig,
    /// Cache TTLs
    #[serde(default)]
    pub cache: CacheConfig,
    /// Presentation units
    #[serde(default)]
    pub units: UnitsConfig,
    /// User-defined weather stations, tried before vendor sitelists
    #[serde(default)]
    pub stations: Vec<CustomStation>,
    /// Attach raw vendor payloads to normalized records
    #[serde(default)]
    pub debug: bool,
}

/// HTTP client limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    /// Bound on a response body in bytes
    #[serde(default = "default_max_response_bytes")]
    pub max_response_bytes: u64,
}

/// Active provider slugs and API keys
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersConfig {
    /// Active geocode provider slug
    #[serde(default = "default_geocode_provider")]
    pub geocode: String,
    /// Active weather provider slug
    #[serde(default = "default_weather_provider")]
    pub weather: String,
    /// Active elevation provider slug
    #[serde(default = "default_elevation_provider")]
    pub elevation: String,
    /// Active static-map provider slug
    #[serde(default = "default_map_provider")]
    pub map: String,
    /// Active venue provider slug, none ships with the crate
    #[serde(default)]
    pub venue: Option<String>,
    /// API keys keyed by provider slug
    #[serde(default)]
    pub api_keys: HashMap<String, String>,
}

/// Cache TTL settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// TTL for conditions lookups, seconds
    #[serde(default = "default_conditions_ttl")]
    pub conditions_ttl_seconds: u64,
    /// TTL for address lookups, seconds
    #[serde(default = "default_address_ttl")]
    pub address_ttl_seconds: u64,
    /// TTL for vendor station sitelists, seconds
    #[serde(default = "default_station_ttl")]
    pub station_ttl_seconds: u64,
}

/// Presentation unit preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitsConfig {
    /// "metric" or "imperial"
    #[serde(default = "default_measurement_system")]
    pub measurement: String,
}

/// A user-defined weather station
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomStation {
    pub id: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Optional display name
    #[serde(default)]
    pub name: Option<String>,
}

// Default value functions
fn default_timeout() -> u64 {
    10
}

fn default_max_response_bytes() -> u64 {
    1024 * 1024
}

fn default_geocode_provider() -> String {
    "nominatim".to_string()
}

fn default_weather_provider() -> String {
    "openmeteo".to_string()
}

fn default_elevation_provider() -> String {
    "openelevation".to_string()
}

fn default_map_provider() -> String {
    "osm".to_string()
}

fn default_conditions_ttl() -> u64 {
    60 * 60
}

fn default_address_ttl() -> u64 {
    24 * 60 * 60
}

fn default_station_ttl() -> u64 {
    24 * 60 * 60
}

fn default_measurement_system() -> String {
    "metric".to_string()
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            max_response_bytes: default_max_response_bytes(),
        }
    }
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            geocode: default_geocode_provider(),
            weather: default_weather_provider(),
            elevation: default_elevation_provider(),
            map: default_map_provider(),
            venue: None,
            api_keys: HashMap::new(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            conditions_ttl_seconds: default_conditions_ttl(),
            address_ttl_seconds: default_address_ttl(),
            station_ttl_seconds: default_station_ttl(),
        }
    }
}

impl Default for UnitsConfig {
    fn default() -> Self {
        Self {
            measurement: default_measurement_system(),
        }
    }
}

impl WhereaboutsConfig {
    /// Load configuration from the default path and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from a specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("whereabouts.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // Environment overrides, e.g. WHEREABOUTS_PROVIDERS__WEATHER
        builder = builder.add_source(
            Environment::with_prefix("WHEREABOUTS")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let config: WhereaboutsConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.validate()?;
        Ok(config)
    }

    /// Default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("whereabouts").join("config.toml"))
    }

    /// API key configured for a provider slug
    #[must_use]
    pub fn api_key(&self, slug: &str) -> Option<&str> {
        self.providers
            .api_keys
            .get(slug)
            .map(String::as_str)
            .filter(|key| !key.is_empty())
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        if self.http.timeout_seconds == 0 || self.http.timeout_seconds > 300 {
            return Err(Error::config(
                "HTTP timeout must be between 1 and 300 seconds",
            )
            .into());
        }

        if self.http.max_response_bytes < 1024 {
            return Err(Error::config(
                "Maximum response size must be at least 1 KiB",
            )
            .into());
        }

        if self.cache.conditions_ttl_seconds > 7 * 24 * 60 * 60 {
            return Err(Error::config("Conditions TTL cannot exceed one week").into());
        }

        let valid_units = ["metric", "imperial"];
        if !valid_units.contains(&self.units.measurement.as_str()) {
            return Err(Error::config(format!(
                "Invalid measurement system '{}'. Must be one of: {}",
                self.units.measurement,
                valid_units.join(", ")
            ))
            .into());
        }

        for (slug, key) in &self.providers.api_keys {
            if key.is_empty() {
                return Err(Error::config(format!(
                    "API key for '{slug}' cannot be empty. Remove it or provide a value."
                ))
                .into());
            }
        }

        for station in &self.stations {
            if !(-90.0..=90.0).contains(&station.latitude)
                || !(-180.0..=180.0).contains(&station.longitude)
            {
                return Err(Error::config(format!(
                    "Custom station '{}' has out-of-range coordinates",
                    station.id
                ))
                .into());
            }
        }

        Ok(())
    }
}
