//! Weather capability: current and historical conditions
//!
//! A [`WeatherProvider`] binds one vendor record to the fetch collaborator,
//! credentials, the result cache, and the user's custom stations. Vendors are
//! either coordinate-scoped (one call against a lat/lon endpoint) or
//! station-based (a sitelist feeds the nearest-station resolver, then the
//! lookup is scoped to the chosen station). The requested time picks the
//! retrieval mode: anything within an hour of now is a current-conditions
//! call, everything else goes through the vendor's time-series endpoint and
//! extracts the matching hour bucket.

pub mod vendors;

use crate::cache::{self, Cache};
use crate::config::WhereaboutsConfig;
use crate::error::{Error, Result};
use crate::http::Fetch;
use crate::models::{CanonicalConditions, Coordinate, StationCandidate};
use crate::station::{
    self, custom_candidates, CUSTOM_STATION_RADIUS_M, NETWORK_STATION_RADIUS_M,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Requested times within this window of "now" use the current endpoint
pub const HISTORICAL_THRESHOLD_SECS: i64 = 3600;

/// Collaborators handed to vendor fetch functions
pub struct FetchCtx<'a> {
    pub fetcher: &'a dyn Fetch,
    pub api_key: Option<&'a str>,
    /// Attach the raw vendor payload to normalized records
    pub debug: bool,
}

impl FetchCtx<'_> {
    /// Credential for vendors that embed the key in the URL path
    pub fn key(&self, slug: &str) -> Result<&str> {
        self.api_key.ok_or_else(|| Error::missing_credentials(slug))
    }
}

/// Operations for a vendor queried directly by coordinate
pub struct CoordinateOps {
    pub current: fn(&FetchCtx, &Coordinate) -> Result<CanonicalConditions>,
    pub historical:
        fn(&FetchCtx, &Coordinate, DateTime<Utc>) -> Result<CanonicalConditions>,
}

/// Operations for a vendor queried per observation station
pub struct StationOps {
    /// Fetch candidate stations near a coordinate
    pub sitelist: fn(&FetchCtx, &Coordinate) -> Result<Vec<StationCandidate>>,
    pub current: fn(&FetchCtx, &StationCandidate) -> Result<CanonicalConditions>,
    pub historical:
        fn(&FetchCtx, &StationCandidate, DateTime<Utc>) -> Result<CanonicalConditions>,
}

pub enum VendorKind {
    Coordinate(CoordinateOps),
    Station(StationOps),
}

/// One weather vendor's configuration
pub struct WeatherVendor {
    pub slug: &'static str,
    pub name: &'static str,
    pub requires_key: bool,
    pub kind: VendorKind,
}

pub struct WeatherProvider {
    vendor: &'static WeatherVendor,
    fetcher: Arc<dyn Fetch>,
    cache: Arc<Cache>,
    api_key: Option<String>,
    conditions_ttl: Duration,
    station_ttl: Duration,
    custom_stations: Vec<StationCandidate>,
    debug: bool,
}

impl WeatherProvider {
    /// Bind a vendor to the collaborators it needs
    pub fn new(
        vendor: &'static WeatherVendor,
        fetcher: Arc<dyn Fetch>,
        cache: Arc<Cache>,
        config: &WhereaboutsConfig,
    ) -> Self {
        Self {
            vendor,
            fetcher,
            cache,
            api_key: config.api_key(vendor.slug).map(str::to_string),
            conditions_ttl: Duration::from_secs(config.cache.conditions_ttl_seconds),
            station_ttl: Duration::from_secs(config.cache.station_ttl_seconds),
            custom_stations: custom_candidates(&config.stations),
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

    /// Conditions at a coordinate, now or at a requested past instant
    ///
    /// `when` of `None`, or within an hour of now, reads the vendor's current
    /// endpoint; anything else is a historical lookup floored to the hour.
    pub fn get_conditions(
        &self,
        coordinate: &Coordinate,
        when: Option<DateTime<Utc>>,
    ) -> Result<CanonicalConditions> {
        if self.vendor.requires_key && self.api_key.is_none() {
            return Err(Error::missing_credentials(self.vendor.slug));
        }
        let ctx = FetchCtx {
            fetcher: self.fetcher.as_ref(),
            api_key: self.api_key.as_deref(),
            debug: self.debug,
        };

        let now = Utc::now();
        let historical = when
            .filter(|t| (*t - now).num_seconds().abs() > HISTORICAL_THRESHOLD_SECS);
        if let Some(t) = historical {
            info!(
                "historical conditions via {} at {} for {}",
                self.vendor.slug,
                t,
                coordinate.format()
            );
        } else {
            info!(
                "current conditions via {} for {}",
                self.vendor.slug,
                coordinate.format()
            );
        }

        match &self.vendor.kind {
            VendorKind::Coordinate(ops) => {
                self.coordinate_lookup(&ctx, ops, coordinate, historical)
            }
            VendorKind::Station(ops) => {
                self.station_lookup(&ctx, ops, coordinate, historical)
            }
        }
    }

    fn coordinate_lookup(
        &self,
        ctx: &FetchCtx,
        ops: &CoordinateOps,
        coordinate: &Coordinate,
        historical: Option<DateTime<Utc>>,
    ) -> Result<CanonicalConditions> {
        let cache_key = cache::conditions_key(
            self.vendor.slug,
            coordinate,
            None,
            historical.map(|t| t.timestamp()),
        );
        self.cache.get_or_fetch(&cache_key, self.conditions_ttl, || {
            let mut conditions = match historical {
                Some(t) => (ops.historical)(ctx, coordinate, t)?,
                None => (ops.current)(ctx, coordinate)?,
            };
            conditions.ensure_summary();
            Ok(conditions)
        })
    }

    fn station_lookup(
        &self,
        ctx: &FetchCtx,
        ops: &StationOps,
        coordinate: &Coordinate,
        historical: Option<DateTime<Utc>>,
    ) -> Result<CanonicalConditions> {
        let (chosen, distance) = self.resolve_station(ctx, ops, coordinate)?;
        let cache_key = cache::conditions_key(
            self.vendor.slug,
            coordinate,
            Some(&chosen.id),
            historical.map(|t| t.timestamp()),
        );
        self.cache.get_or_fetch(&cache_key, self.conditions_ttl, || {
            let mut conditions = match historical {
                Some(t) => (ops.historical)(ctx, &chosen, t)?,
                None => (ops.current)(ctx, &chosen)?,
            };
            conditions.station_id = Some(chosen.id.clone());
            conditions.distance = Some(distance);
            conditions.ensure_summary();
            Ok(conditions)
        })
    }

    /// Pick the observing station: user-defined stations first within their
    /// tight radius, then the vendor sitelist within the network radius
    fn resolve_station(
        &self,
        ctx: &FetchCtx,
        ops: &StationOps,
        coordinate: &Coordinate,
    ) -> Result<(StationCandidate, f64)> {
        if let Ok(found) =
            station::nearest(coordinate, &self.custom_stations, CUSTOM_STATION_RADIUS_M)
        {
            debug!("using custom station '{}'", found.0.id);
            return Ok(found);
        }

        let sitelist_key = cache::sitelist_key(self.vendor.slug, coordinate);
        let candidates: Vec<StationCandidate> =
            self.cache.get_or_fetch(&sitelist_key, self.station_ttl, || {
                (ops.sitelist)(ctx, coordinate)
            })?;
        station::nearest(coordinate, &candidates, NETWORK_STATION_RADIUS_M)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::stub::StubFetcher;
    use chrono::TimeZone;
    use serde_json::json;

    fn provider_for(
        slug: &str,
        fetcher: Arc<StubFetcher>,
        config: &WhereaboutsConfig,
    ) -> WeatherProvider {
        WeatherProvider::new(
            vendors::vendor_by_slug(slug).unwrap(),
            fetcher,
            Arc::new(Cache::new()),
            config,
        )
    }

    fn openmeteo_current_payload() -> serde_json::Value {
        json!({
            "latitude": 45.0,
            "longitude": -75.0,
            "current": {
                "time": 1754560800,
                "temperature_2m": 21.4,
                "relative_humidity_2m": 55,
                "dew_point_2m": 12.1,
                "apparent_temperature": 21.0,
                "precipitation": 0.0,
                "rain": 0.0,
                "snowfall": 0.0,
                "weather_code": 2,
                "cloud_cover": 40,
                "surface_pressure": 1012.3,
                "wind_speed_10m": 3.2,
                "wind_direction_10m": 220,
                "wind_gusts_10m": 6.1
            }
        })
    }

    #[test]
    fn test_current_conditions_normalized() {
        let fetcher = Arc::new(
            StubFetcher::new().route("api.open-meteo.com", openmeteo_current_payload()),
        );
        let config = WhereaboutsConfig::default();
        let provider = provider_for("openmeteo", fetcher, &config);

        let coordinate = Coordinate::new(45.0, -75.0).unwrap();
        let conditions = provider.get_conditions(&coordinate, None).unwrap();

        assert_eq!(conditions.temperature, Some(21.4));
        assert_eq!(conditions.humidity, Some(55.0));
        assert_eq!(conditions.pressure, Some(1012.3));
        assert_eq!(conditions.wind.speed, Some(3.2));
        assert_eq!(conditions.wind.degree, Some(220.0));
        // WMO code 2 (partly cloudy) lands on the shared 802
        assert_eq!(conditions.code, 802);
        assert!(conditions.summary.is_some());
        assert!(conditions.station_id.is_none());
        assert!(conditions.raw.is_none());
    }

    #[test]
    fn test_current_conditions_cached_across_calls() {
        let fetcher = Arc::new(
            StubFetcher::new().route("api.open-meteo.com", openmeteo_current_payload()),
        );
        let config = WhereaboutsConfig::default();
        let provider = provider_for("openmeteo", fetcher.clone(), &config);

        let coordinate = Coordinate::new(45.0, -75.0).unwrap();
        provider.get_conditions(&coordinate, None).unwrap();
        provider.get_conditions(&coordinate, None).unwrap();
        assert_eq!(fetcher.call_count(), 1);
    }

    #[test]
    fn test_near_now_request_uses_current_endpoint() {
        let fetcher = Arc::new(
            StubFetcher::new().route("api.open-meteo.com", openmeteo_current_payload()),
        );
        let config = WhereaboutsConfig::default();
        let provider = provider_for("openmeteo", fetcher.clone(), &config);

        let coordinate = Coordinate::new(45.0, -75.0).unwrap();
        let almost_now = Utc::now() + chrono::Duration::minutes(30);
        provider.get_conditions(&coordinate, Some(almost_now)).unwrap();

        let calls = fetcher.calls.lock().unwrap();
        assert!(calls[0].0.contains("api.open-meteo.com/v1/forecast"));
    }

    #[test]
    fn test_historical_request_uses_archive_endpoint() {
        let when = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let payload = json!({
            "hourly": {
                "time": [when.timestamp() - 3600, when.timestamp(), when.timestamp() + 3600],
                "temperature_2m": [14.0, 15.5, 16.0],
                "relative_humidity_2m": [70, 65, 60],
                "dew_point_2m": [9.0, 9.1, 9.2],
                "precipitation": [0.0, 0.2, 0.0],
                "snowfall": [0.0, 0.0, 0.0],
                "weather_code": [3, 61, 3],
                "cloud_cover": [90, 100, 80],
                "surface_pressure": [1008.0, 1007.5, 1007.0],
                "wind_speed_10m": [4.0, 4.5, 5.0],
                "wind_direction_10m": [180, 190, 200],
                "wind_gusts_10m": [7.0, 8.0, 9.0]
            }
        });
        let fetcher = Arc::new(StubFetcher::new().route("archive-api.open-meteo.com", payload));
        let config = WhereaboutsConfig::default();
        let provider = provider_for("openmeteo", fetcher, &config);

        let coordinate = Coordinate::new(45.0, -75.0).unwrap();
        let conditions = provider
            .get_conditions(&coordinate, Some(when))
            .unwrap();
        assert_eq!(conditions.temperature, Some(15.5));
        // WMO 61 (slight rain) -> shared 500
        assert_eq!(conditions.code, 500);
        assert_eq!(conditions.observed_at, Some(when.timestamp()));
    }

    #[test]
    fn test_historical_hour_with_no_bucket_is_no_results() {
        let when = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let payload = json!({
            "hourly": {
                "time": [when.timestamp() - 7200, when.timestamp() - 3600],
                "temperature_2m": [14.0, 15.5],
                "weather_code": [3, 3],
                "wind_speed_10m": [4.0, 4.5],
                "wind_direction_10m": [180, 190]
            }
        });
        let fetcher = Arc::new(StubFetcher::new().route("archive-api.open-meteo.com", payload));
        let config = WhereaboutsConfig::default();
        let provider = provider_for("openmeteo", fetcher, &config);

        let coordinate = Coordinate::new(45.0, -75.0).unwrap();
        let result = provider.get_conditions(&coordinate, Some(when));
        assert!(matches!(result, Err(Error::NoResults(_))));
    }

    #[test]
    fn test_missing_credentials_short_circuits() {
        let fetcher = Arc::new(StubFetcher::new());
        let config = WhereaboutsConfig::default();
        let provider = provider_for("openweathermap", fetcher.clone(), &config);

        let coordinate = Coordinate::new(45.0, -75.0).unwrap();
        let result = provider.get_conditions(&coordinate, None);
        assert!(matches!(result, Err(Error::MissingCredentials { .. })));
        assert_eq!(fetcher.call_count(), 0);
    }

    #[test]
    fn test_station_vendor_resolves_nearest_within_radius() {
        // Stations at ~150 km and ~95 km; the 95 km one is inside the
        // 100 km network radius and must be chosen after the sort.
        let sitelist = json!({
            "data": [
                {"id": "FAR01", "name": {"en": "Far Station"},
                 "latitude": 46.35, "longitude": -75.0},
                {"id": "NEAR1", "name": {"en": "Near Station"},
                 "latitude": 45.855, "longitude": -75.0}
            ]
        });
        let hourly = json!({
            "data": [{
                "time": format!("{} 00:00:00", Utc::now().format("%Y-%m-%d")),
                "temp": 18.0, "dwpt": 10.0, "rhum": 60, "prcp": 0.0,
                "snow": 0, "wdir": 270, "wspd": 14.4, "wpgt": 20.0,
                "pres": 1015.0, "coco": 1
            }]
        });
        let fetcher = Arc::new(
            StubFetcher::new()
                .route("stations/nearby", sitelist)
                .route("stations/hourly", hourly),
        );
        let mut config = WhereaboutsConfig::default();
        config
            .providers
            .api_keys
            .insert("meteostat".to_string(), "sekrit".to_string());
        let provider = provider_for("meteostat", fetcher, &config);

        let coordinate = Coordinate::new(45.0, -75.0).unwrap();
        let conditions = provider.get_conditions(&coordinate, None).unwrap();
        assert_eq!(conditions.station_id.as_deref(), Some("NEAR1"));
        let distance = conditions.distance.unwrap();
        assert!(
            (90_000.0..100_000.0).contains(&distance),
            "distance was {distance}"
        );
        // Meteostat wind arrives in km/h and is stored as m/s
        assert_eq!(conditions.wind.speed, Some(4.0));
    }

    #[test]
    fn test_station_vendor_not_found_beyond_radius() {
        let sitelist = json!({
            "data": [
                {"id": "FAR01", "name": {"en": "Far"},
                 "latitude": 46.35, "longitude": -75.0}
            ]
        });
        let fetcher = Arc::new(StubFetcher::new().route("stations/nearby", sitelist));
        let mut config = WhereaboutsConfig::default();
        config
            .providers
            .api_keys
            .insert("meteostat".to_string(), "sekrit".to_string());
        let provider = provider_for("meteostat", fetcher, &config);

        // Every candidate is ~150 km away, past the 100 km bound
        let coordinate = Coordinate::new(45.0, -75.0).unwrap();
        let result = provider.get_conditions(&coordinate, None);
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn test_custom_station_preferred_within_tight_radius() {
        let hourly = json!({
            "data": [{
                "time": format!("{} 00:00:00", Utc::now().format("%Y-%m-%d")),
                "temp": 17.0, "dwpt": 9.0, "rhum": 55, "prcp": 0.0,
                "snow": 0, "wdir": 180, "wspd": 7.2, "wpgt": 11.0,
                "pres": 1013.0, "coco": 3
            }]
        });
        let fetcher = Arc::new(StubFetcher::new().route("stations/hourly", hourly));
        let mut config = WhereaboutsConfig::default();
        config
            .providers
            .api_keys
            .insert("meteostat".to_string(), "sekrit".to_string());
        config.stations.push(crate::config::CustomStation {
            id: "10637".to_string(),
            latitude: 45.01,
            longitude: -75.0,
            name: Some("Backyard".to_string()),
        });
        let provider = provider_for("meteostat", fetcher.clone(), &config);

        let coordinate = Coordinate::new(45.0, -75.0).unwrap();
        let conditions = provider.get_conditions(&coordinate, None).unwrap();
        assert_eq!(conditions.station_id.as_deref(), Some("10637"));
        // The sitelist endpoint was never contacted
        assert!(fetcher
            .calls
            .lock()
            .unwrap()
            .iter()
            .all(|(url, _)| !url.contains("stations/nearby")));
    }
}
