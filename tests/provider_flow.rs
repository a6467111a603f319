//! End-to-end provider scenarios through a stubbed HTTP boundary

use chrono::{TimeZone, Utc};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use whereabouts::{
    Capability, Coordinate, Error, Fetch, MapParams, Registry, WhereaboutsConfig,
};

/// Honor RUST_LOG when running tests; repeated calls are a no-op
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// Canned-response fetcher: URL substring -> payload
struct CannedFetcher {
    routes: Vec<(String, Value)>,
    calls: Mutex<Vec<String>>,
}

impl CannedFetcher {
    fn new(routes: Vec<(&str, Value)>) -> Self {
        Self {
            routes: routes
                .into_iter()
                .map(|(fragment, payload)| (fragment.to_string(), payload))
                .collect(),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Fetch for CannedFetcher {
    fn fetch_json(
        &self,
        url: &str,
        _params: &[(&str, String)],
        _headers: &[(&str, String)],
    ) -> whereabouts::Result<Value> {
        self.calls.lock().unwrap().push(url.to_string());
        self.routes
            .iter()
            .find(|(fragment, _)| url.contains(fragment.as_str()))
            .map(|(_, payload)| payload.clone())
            .ok_or_else(|| Error::Transport(format!("no canned route for {url}")))
    }
}

fn nominatim_ottawa() -> Value {
    json!({
        "lat": "45.01",
        "lon": "-75.44",
        "display_name": "Ottawa, Ontario, Canada",
        "address": {
            "city": "Ottawa",
            "state": "Ontario",
            "country": "Canada",
            "country_code": "ca",
            "postcode": "K1A 0A9"
        }
    })
}

/// Reverse-geocoding an Ottawa-area coordinate yields a fully normalized
/// Canadian address
#[test]
fn test_reverse_geocode_scenario_through_registry() {
    init_tracing();
    let fetcher = Arc::new(CannedFetcher::new(vec![(
        "nominatim.openstreetmap.org/reverse",
        nominatim_ottawa(),
    )]));
    let config = WhereaboutsConfig::default();
    let registry = Registry::new(&config, fetcher);

    let coordinate = Coordinate::new(45.01, -75.44).unwrap();
    let address = registry
        .geocode()
        .unwrap()
        .reverse_lookup(&coordinate)
        .unwrap();

    assert_eq!(address.country_code.as_deref(), Some("CA"));
    assert_eq!(address.region.as_deref(), Some("Ontario"));
    assert_eq!(address.locality.as_deref(), Some("Ottawa"));
    assert!(address.display_name.contains("Ottawa"));
    assert!(address.display_name.contains("Ontario"));
}

/// Station-based weather: the sort-then-threshold resolver selects the
/// 95 km station under a 100 km radius and stamps id and distance
#[test]
fn test_station_weather_selects_closest_within_bound() {
    init_tracing();
    let today = Utc::now().format("%Y-%m-%d");
    let fetcher = Arc::new(CannedFetcher::new(vec![
        (
            "stations/nearby",
            json!({
                "data": [
                    {"id": "FAR01", "name": {"en": "Far"},
                     "latitude": 46.35, "longitude": -75.0},
                    {"id": "NEAR1", "name": {"en": "Near"},
                     "latitude": 45.855, "longitude": -75.0}
                ]
            }),
        ),
        (
            "stations/hourly",
            json!({
                "data": [{
                    "time": format!("{today} 00:00:00"),
                    "temp": 19.5, "dwpt": 11.0, "rhum": 58, "prcp": 0.0,
                    "snow": 0, "wdir": 250, "wspd": 10.8, "wpgt": 18.0,
                    "pres": 1016.0, "coco": 2
                }]
            }),
        ),
    ]));
    let mut config = WhereaboutsConfig::default();
    config.providers.weather = "meteostat".to_string();
    config
        .providers
        .api_keys
        .insert("meteostat".to_string(), "test-key".to_string());
    let registry = Registry::new(&config, fetcher);

    let coordinate = Coordinate::new(45.0, -75.0).unwrap();
    let conditions = registry
        .weather()
        .unwrap()
        .get_conditions(&coordinate, None)
        .unwrap();

    assert_eq!(conditions.station_id.as_deref(), Some("NEAR1"));
    let distance = conditions.distance.unwrap();
    assert!((90_000.0..100_000.0).contains(&distance), "got {distance}");
    assert_eq!(conditions.temperature, Some(19.5));
    // km/h to m/s at the normalization seam
    assert_eq!(conditions.wind.speed, Some(3.0));
    // Meteostat coco 2 (fair) lands on shared 801
    assert_eq!(conditions.code, 801);
}

/// A historical request for an hour the vendor has no bucket for surfaces
/// as NoResults, not as a zero-filled record
#[test]
fn test_historical_missing_hour_is_no_results() {
    let when = Utc.with_ymd_and_hms(2023, 11, 4, 9, 0, 0).unwrap();
    let fetcher = Arc::new(CannedFetcher::new(vec![(
        "archive-api.open-meteo.com",
        json!({
            "hourly": {
                "time": [when.timestamp() + 3600, when.timestamp() + 7200],
                "temperature_2m": [10.0, 11.0],
                "weather_code": [3, 3],
                "wind_speed_10m": [2.0, 2.5],
                "wind_direction_10m": [90, 100]
            }
        }),
    )]));
    let config = WhereaboutsConfig::default();
    let registry = Registry::new(&config, fetcher);

    let coordinate = Coordinate::new(52.52, 13.405).unwrap();
    let result = registry
        .weather()
        .unwrap()
        .get_conditions(&coordinate, Some(when));
    assert!(matches!(result, Err(Error::NoResults(_))));
}

/// A successful historical lookup extracts exactly the requested hour
#[test]
fn test_historical_extracts_requested_hour() {
    let when = Utc.with_ymd_and_hms(2023, 11, 4, 9, 30, 0).unwrap();
    let hour = Utc.with_ymd_and_hms(2023, 11, 4, 9, 0, 0).unwrap();
    let fetcher = Arc::new(CannedFetcher::new(vec![(
        "archive-api.open-meteo.com",
        json!({
            "hourly": {
                "time": [hour.timestamp() - 3600, hour.timestamp()],
                "temperature_2m": [8.0, 9.5],
                "relative_humidity_2m": [80, 75],
                "weather_code": [61, 80],
                "wind_speed_10m": [3.0, 3.5],
                "wind_direction_10m": [180, 185]
            }
        }),
    )]));
    let config = WhereaboutsConfig::default();
    let registry = Registry::new(&config, fetcher);

    let coordinate = Coordinate::new(52.52, 13.405).unwrap();
    let conditions = registry
        .weather()
        .unwrap()
        .get_conditions(&coordinate, Some(when))
        .unwrap();
    // 09:30 floors to the 09:00 bucket
    assert_eq!(conditions.temperature, Some(9.5));
    assert_eq!(conditions.observed_at, Some(hour.timestamp()));
    // WMO 80 (slight rain showers) -> shared 520
    assert_eq!(conditions.code, 520);
}

/// Identical lookups inside the TTL hit the cache instead of the vendor
#[test]
fn test_repeat_lookup_served_from_cache() {
    let fetcher = Arc::new(CannedFetcher::new(vec![(
        "nominatim.openstreetmap.org/reverse",
        nominatim_ottawa(),
    )]));
    let config = WhereaboutsConfig::default();
    let registry = Registry::new(&config, fetcher.clone());

    let coordinate = Coordinate::new(45.01, -75.44).unwrap();
    let geocoder = registry.geocode().unwrap();
    geocoder.reverse_lookup(&coordinate).unwrap();
    geocoder.reverse_lookup(&coordinate).unwrap();

    assert_eq!(fetcher.calls().len(), 1);
}

/// Switching the active provider never touches caller code
#[test]
fn test_dispatch_follows_active_configuration() {
    let fetcher = Arc::new(CannedFetcher::new(vec![]));
    let mut config = WhereaboutsConfig::default();
    config.providers.geocode = "here".to_string();
    config.providers.weather = "nws".to_string();
    let registry = Registry::new(&config, fetcher);

    assert_eq!(registry.geocode().unwrap().slug(), "here");
    assert_eq!(registry.weather().unwrap().slug(), "nws");
    assert_eq!(registry.active_slug(Capability::Geocode).unwrap(), "here");
    assert!(registry.active_slug(Capability::Venue).is_err());
}

/// A keyed provider without credentials fails before any network traffic
#[test]
fn test_missing_credentials_never_reach_the_wire() {
    let fetcher = Arc::new(CannedFetcher::new(vec![]));
    let mut config = WhereaboutsConfig::default();
    config.providers.geocode = "opencage".to_string();
    let registry = Registry::new(&config, fetcher.clone());

    let coordinate = Coordinate::new(45.0, -75.0).unwrap();
    let result = registry.geocode().unwrap().reverse_lookup(&coordinate);
    assert!(matches!(result, Err(Error::MissingCredentials { .. })));
    assert!(fetcher.calls().is_empty());
}

/// The map capability produces a URL without fetching anything
#[test]
fn test_static_map_url_construction() {
    let fetcher = Arc::new(CannedFetcher::new(vec![]));
    let config = WhereaboutsConfig::default();
    let registry = Registry::new(&config, fetcher.clone());

    let coordinate = Coordinate::new(45.4215, -75.6972).unwrap();
    let url = registry
        .map()
        .unwrap()
        .static_map_url(&coordinate, &MapParams::default())
        .unwrap();
    assert!(url.starts_with("https://"));
    assert!(url.contains("45.4215"));
    assert!(fetcher.calls().is_empty());
}
