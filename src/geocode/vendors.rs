//! Geocode vendor configurations
//!
//! One [`GeocodeVendor`] record per upstream service. The flatteners reshape
//! each vendor's result into a single flat object; everything downstream of
//! that is the shared engine. When adding a vendor, the envelope validator
//! must turn the vendor's own "no results" signal (empty array, status field,
//! missing key) into [`Error::NoResults`] rather than letting it crash the
//! chain resolution.

use super::engine::{AddressChains, GeocodeVendor};
use crate::error::{Error, Result};
use crate::fallback::dig;
use crate::models::Coordinate;
use serde_json::{Map, Value};

const EMPTY: &[&str] = &[];

fn merge_object(target: &mut Map<String, Value>, source: &Value) {
    if let Some(map) = source.as_object() {
        for (key, value) in map {
            target.insert(key.clone(), value.clone());
        }
    }
}

// --- Nominatim (and LocationIQ, which speaks the same schema) ---

fn nominatim_first_result(raw: &Value) -> Result<Value> {
    match raw {
        Value::Array(items) => items
            .first()
            .cloned()
            .ok_or_else(|| Error::no_results("empty result array")),
        Value::Object(map) => {
            if let Some(message) = map.get("error") {
                return Err(Error::no_results(message.to_string()));
            }
            if !map.contains_key("address") {
                return Err(Error::malformed("missing 'address' object"));
            }
            Ok(raw.clone())
        }
        _ => Err(Error::malformed("unexpected top-level payload")),
    }
}

fn nominatim_flatten(result: &Value) -> Value {
    let mut flat = Map::new();
    merge_object(&mut flat, &result["address"]);
    for key in ["display_name", "name", "lat", "lon"] {
        if let Some(value) = result.get(key) {
            flat.insert(key.to_string(), value.clone());
        }
    }
    Value::Object(flat)
}

const NOMINATIM_CHAINS: AddressChains = AddressChains {
    name: &["name"],
    street_address: EMPTY,
    street_number: &["house_number"],
    street: &["road", "pedestrian", "footway"],
    extended: &["neighbourhood", "suburb", "quarter", "hamlet"],
    locality: &["city", "town", "village", "municipality"],
    region: &["state_district", "state", "county", "region"],
    region_state_first: &["state", "county", "region", "state_district"],
    state_first_countries: &["US", "FR"],
    region_code: EMPTY,
    postal_code: &["postcode"],
    country_code: &["country_code"],
    country_name: &["country"],
    display_name: &["display_name"],
    latitude: &["lat"],
    longitude: &["lon"],
    altitude: EMPTY,
    url: EMPTY,
    photo: EMPTY,
    timezone: EMPTY,
};

fn nominatim_reverse_params(coordinate: &Coordinate) -> Vec<(&'static str, String)> {
    vec![
        ("format", "jsonv2".to_string()),
        ("lat", coordinate.latitude.to_string()),
        ("lon", coordinate.longitude.to_string()),
        ("addressdetails", "1".to_string()),
    ]
}

fn nominatim_forward_params(query: &str) -> Vec<(&'static str, String)> {
    vec![
        ("format", "jsonv2".to_string()),
        ("q", query.to_string()),
        ("addressdetails", "1".to_string()),
        ("limit", "1".to_string()),
    ]
}

// --- OpenCage ---

fn opencage_first_result(raw: &Value) -> Result<Value> {
    if let Some(code) = dig(raw, &["status", "code"]).and_then(Value::as_u64) {
        if code != 200 {
            let message = dig(raw, &["status", "message"])
                .and_then(Value::as_str)
                .unwrap_or("unknown");
            return Err(Error::upstream(code as u16, message));
        }
    }
    let results = raw
        .get("results")
        .and_then(Value::as_array)
        .ok_or_else(|| Error::malformed("missing 'results' array"))?;
    results
        .first()
        .cloned()
        .ok_or_else(|| Error::no_results("empty result array"))
}

fn opencage_flatten(result: &Value) -> Value {
    let mut flat = Map::new();
    merge_object(&mut flat, &result["components"]);
    if let Some(formatted) = result.get("formatted") {
        flat.insert("formatted".to_string(), formatted.clone());
    }
    if let Some(tz) = dig(result, &["annotations", "timezone", "name"]) {
        flat.insert("timezone".to_string(), tz.clone());
    }
    if let Some(lat) = dig(result, &["geometry", "lat"]) {
        flat.insert("lat".to_string(), lat.clone());
    }
    if let Some(lng) = dig(result, &["geometry", "lng"]) {
        flat.insert("lng".to_string(), lng.clone());
    }
    Value::Object(flat)
}

const OPENCAGE_CHAINS: AddressChains = AddressChains {
    name: EMPTY,
    street_address: EMPTY,
    street_number: &["house_number"],
    street: &["road", "street"],
    extended: &["neighbourhood", "suburb"],
    locality: &["city", "town", "village", "municipality"],
    region: &["state_district", "state", "county", "region"],
    region_state_first: &["state", "county", "region", "state_district"],
    state_first_countries: &["US", "FR"],
    region_code: &["state_code"],
    postal_code: &["postcode"],
    country_code: &["ISO_3166-1_alpha-2", "country_code"],
    country_name: &["country"],
    display_name: &["formatted"],
    latitude: &["lat"],
    longitude: &["lng"],
    altitude: EMPTY,
    url: EMPTY,
    photo: EMPTY,
    timezone: &["timezone"],
};

fn opencage_reverse_params(coordinate: &Coordinate) -> Vec<(&'static str, String)> {
    vec![
        (
            "q",
            format!("{},{}", coordinate.latitude, coordinate.longitude),
        ),
        ("limit", "1".to_string()),
        ("no_annotations", "0".to_string()),
    ]
}

fn opencage_forward_params(query: &str) -> Vec<(&'static str, String)> {
    vec![
        ("q", query.to_string()),
        ("limit", "1".to_string()),
        ("no_annotations", "0".to_string()),
    ]
}

// --- Google ---

fn google_first_result(raw: &Value) -> Result<Value> {
    let status = raw
        .get("status")
        .and_then(Value::as_str)
        .ok_or_else(|| Error::malformed("missing 'status' field"))?;
    match status {
        "OK" => {}
        "ZERO_RESULTS" => return Err(Error::no_results("ZERO_RESULTS")),
        other => {
            let message = raw
                .get("error_message")
                .and_then(Value::as_str)
                .unwrap_or(other);
            return Err(Error::upstream(200, format!("{other}: {message}")));
        }
    }
    dig(raw, &["results", "0"])
        .cloned()
        .ok_or_else(|| Error::no_results("empty result array"))
}

fn google_flatten(result: &Value) -> Value {
    let mut flat = Map::new();
    if let Some(components) = result.get("address_components").and_then(Value::as_array) {
        for component in components {
            let Some(types) = component.get("types").and_then(Value::as_array) else {
                continue;
            };
            for ty in types.iter().filter_map(Value::as_str) {
                if let Some(long) = component.get("long_name") {
                    flat.insert(ty.to_string(), long.clone());
                }
                if let Some(short) = component.get("short_name") {
                    flat.insert(format!("{ty}_code"), short.clone());
                }
            }
        }
    }
    if let Some(formatted) = result.get("formatted_address") {
        flat.insert("formatted_address".to_string(), formatted.clone());
    }
    if let Some(lat) = dig(result, &["geometry", "location", "lat"]) {
        flat.insert("lat".to_string(), lat.clone());
    }
    if let Some(lng) = dig(result, &["geometry", "location", "lng"]) {
        flat.insert("lng".to_string(), lng.clone());
    }
    Value::Object(flat)
}

const GOOGLE_CHAINS: AddressChains = AddressChains {
    name: &["point_of_interest", "premise"],
    street_address: EMPTY,
    street_number: &["street_number"],
    street: &["route"],
    extended: &["subpremise", "neighborhood"],
    locality: &[
        "locality",
        "postal_town",
        "sublocality",
        "administrative_area_level_3",
    ],
    region: &["administrative_area_level_1"],
    region_state_first: &["administrative_area_level_1"],
    state_first_countries: EMPTY,
    region_code: &["administrative_area_level_1_code"],
    postal_code: &["postal_code"],
    country_code: &["country_code"],
    country_name: &["country"],
    display_name: &["formatted_address"],
    latitude: &["lat"],
    longitude: &["lng"],
    altitude: EMPTY,
    url: EMPTY,
    photo: EMPTY,
    timezone: EMPTY,
};

fn google_reverse_params(coordinate: &Coordinate) -> Vec<(&'static str, String)> {
    vec![(
        "latlng",
        format!("{},{}", coordinate.latitude, coordinate.longitude),
    )]
}

fn google_forward_params(query: &str) -> Vec<(&'static str, String)> {
    vec![("address", query.to_string())]
}

// --- Bing ---

fn bing_first_result(raw: &Value) -> Result<Value> {
    if let Some(status) = raw.get("statusCode").and_then(Value::as_u64) {
        if status != 200 {
            let message = raw
                .get("statusDescription")
                .and_then(Value::as_str)
                .unwrap_or("unknown");
            return Err(Error::upstream(status as u16, message));
        }
    }
    dig(raw, &["resourceSets", "0", "resources", "0"])
        .cloned()
        .ok_or_else(|| Error::no_results("empty resource set"))
}

fn bing_flatten(result: &Value) -> Value {
    let mut flat = Map::new();
    merge_object(&mut flat, &result["address"]);
    if let Some(name) = result.get("name") {
        flat.insert("name".to_string(), name.clone());
    }
    if let Some(lat) = dig(result, &["point", "coordinates", "0"]) {
        flat.insert("lat".to_string(), lat.clone());
    }
    if let Some(lon) = dig(result, &["point", "coordinates", "1"]) {
        flat.insert("lon".to_string(), lon.clone());
    }
    Value::Object(flat)
}

const BING_CHAINS: AddressChains = AddressChains {
    name: &["name"],
    street_address: &["addressLine"],
    street_number: EMPTY,
    street: EMPTY,
    extended: &["district"],
    locality: &["locality"],
    region: &["adminDistrict", "adminDistrict2"],
    region_state_first: &["adminDistrict", "adminDistrict2"],
    state_first_countries: EMPTY,
    region_code: EMPTY,
    postal_code: &["postalCode"],
    country_code: &["countryRegionIso2"],
    country_name: &["countryRegion"],
    display_name: &["formattedAddress"],
    latitude: &["lat"],
    longitude: &["lon"],
    altitude: EMPTY,
    url: EMPTY,
    photo: EMPTY,
    timezone: EMPTY,
};

fn bing_reverse_params(_coordinate: &Coordinate) -> Vec<(&'static str, String)> {
    vec![
        ("o", "json".to_string()),
        ("incl", "ciso2".to_string()),
    ]
}

fn bing_forward_params(query: &str) -> Vec<(&'static str, String)> {
    vec![
        ("o", "json".to_string()),
        ("incl", "ciso2".to_string()),
        ("query", query.to_string()),
    ]
}

// --- HERE ---

fn here_first_result(raw: &Value) -> Result<Value> {
    if let (Some(status), Some(title)) = (
        raw.get("status").and_then(Value::as_u64),
        raw.get("title").and_then(Value::as_str),
    ) {
        return Err(Error::upstream(status as u16, title));
    }
    let items = raw
        .get("items")
        .and_then(Value::as_array)
        .ok_or_else(|| Error::malformed("missing 'items' array"))?;
    items
        .first()
        .cloned()
        .ok_or_else(|| Error::no_results("empty items array"))
}

fn here_flatten(result: &Value) -> Value {
    let mut flat = Map::new();
    merge_object(&mut flat, &result["address"]);
    if let Some(title) = result.get("title") {
        flat.insert("title".to_string(), title.clone());
    }
    if let Some(lat) = dig(result, &["position", "lat"]) {
        flat.insert("lat".to_string(), lat.clone());
    }
    if let Some(lng) = dig(result, &["position", "lng"]) {
        flat.insert("lng".to_string(), lng.clone());
    }
    Value::Object(flat)
}

const HERE_CHAINS: AddressChains = AddressChains {
    name: &["title"],
    street_address: EMPTY,
    street_number: &["houseNumber"],
    street: &["street"],
    extended: &["district"],
    locality: &["city"],
    region: &["state", "county"],
    region_state_first: &["state", "county"],
    state_first_countries: EMPTY,
    region_code: &["stateCode"],
    postal_code: &["postalCode"],
    // HERE emits ISO 3166-1 alpha-3; the engine normalizes it
    country_code: &["countryCode"],
    country_name: &["countryName"],
    display_name: &["label"],
    latitude: &["lat"],
    longitude: &["lng"],
    altitude: EMPTY,
    url: EMPTY,
    photo: EMPTY,
    timezone: EMPTY,
};

fn here_reverse_params(coordinate: &Coordinate) -> Vec<(&'static str, String)> {
    vec![
        (
            "at",
            format!("{},{}", coordinate.latitude, coordinate.longitude),
        ),
        ("lang", "en-US".to_string()),
    ]
}

fn here_forward_params(query: &str) -> Vec<(&'static str, String)> {
    vec![("q", query.to_string()), ("lang", "en-US".to_string())]
}

// --- MapQuest ---

fn mapquest_first_result(raw: &Value) -> Result<Value> {
    if let Some(code) = dig(raw, &["info", "statuscode"]).and_then(Value::as_u64) {
        if code != 0 {
            let message = dig(raw, &["info", "messages", "0"])
                .and_then(Value::as_str)
                .unwrap_or("unknown");
            return Err(Error::upstream(code as u16, message));
        }
    }
    dig(raw, &["results", "0", "locations", "0"])
        .cloned()
        .ok_or_else(|| Error::no_results("empty locations array"))
}

fn mapquest_flatten(result: &Value) -> Value {
    let mut flat = Map::new();
    merge_object(&mut flat, result);
    if let Some(lat) = dig(result, &["latLng", "lat"]) {
        flat.insert("lat".to_string(), lat.clone());
    }
    if let Some(lng) = dig(result, &["latLng", "lng"]) {
        flat.insert("lng".to_string(), lng.clone());
    }
    Value::Object(flat)
}

const MAPQUEST_CHAINS: AddressChains = AddressChains {
    name: EMPTY,
    street_address: EMPTY,
    street_number: EMPTY,
    street: &["street"],
    // adminArea6 is MapQuest's neighborhood level
    extended: &["adminArea6"],
    locality: &["adminArea5"],
    region: EMPTY,
    region_state_first: EMPTY,
    state_first_countries: EMPTY,
    region_code: &["adminArea3"],
    postal_code: &["postalCode"],
    country_code: &["adminArea1"],
    country_name: EMPTY,
    display_name: EMPTY,
    latitude: &["lat"],
    longitude: &["lng"],
    altitude: EMPTY,
    url: EMPTY,
    photo: EMPTY,
    timezone: EMPTY,
};

fn mapquest_reverse_params(coordinate: &Coordinate) -> Vec<(&'static str, String)> {
    vec![(
        "location",
        format!("{},{}", coordinate.latitude, coordinate.longitude),
    )]
}

fn mapquest_forward_params(query: &str) -> Vec<(&'static str, String)> {
    vec![("location", query.to_string())]
}

// --- GeoNames ---

fn geonames_first_result(raw: &Value) -> Result<Value> {
    if let Some(status) = raw.get("status") {
        let code = status.get("value").and_then(Value::as_u64).unwrap_or(0);
        let message = status
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("unknown");
        return Err(Error::upstream(code as u16, message));
    }
    let results = raw
        .get("geonames")
        .and_then(Value::as_array)
        .ok_or_else(|| Error::malformed("missing 'geonames' array"))?;
    results
        .first()
        .cloned()
        .ok_or_else(|| Error::no_results("empty geonames array"))
}

fn geonames_flatten(result: &Value) -> Value {
    let mut flat = Map::new();
    merge_object(&mut flat, result);
    if let Some(tz) = dig(result, &["timezone", "timeZoneId"]) {
        flat.insert("timeZoneId".to_string(), tz.clone());
    }
    Value::Object(flat)
}

const GEONAMES_CHAINS: AddressChains = AddressChains {
    name: &["name", "toponymName"],
    street_address: EMPTY,
    street_number: EMPTY,
    street: EMPTY,
    extended: &["adminName2"],
    locality: &["name"],
    region: &["adminName1"],
    region_state_first: &["adminName1"],
    state_first_countries: EMPTY,
    region_code: &["adminCode1"],
    postal_code: EMPTY,
    country_code: &["countryCode"],
    country_name: &["countryName"],
    display_name: EMPTY,
    latitude: &["lat"],
    longitude: &["lng"],
    altitude: &["elevation", "srtm3", "astergdem"],
    url: EMPTY,
    photo: EMPTY,
    timezone: &["timeZoneId"],
};

fn geonames_reverse_params(coordinate: &Coordinate) -> Vec<(&'static str, String)> {
    vec![
        ("lat", coordinate.latitude.to_string()),
        ("lng", coordinate.longitude.to_string()),
        ("style", "FULL".to_string()),
    ]
}

fn geonames_forward_params(query: &str) -> Vec<(&'static str, String)> {
    vec![
        ("q", query.to_string()),
        ("maxRows", "1".to_string()),
        ("style", "FULL".to_string()),
    ]
}

/// Every geocode vendor the crate ships
pub static GEOCODE_VENDORS: &[GeocodeVendor] = &[
    GeocodeVendor {
        slug: "nominatim",
        name: "OpenStreetMap Nominatim",
        requires_key: false,
        key_param: None,
        reverse_endpoint: "https://nominatim.openstreetmap.org/reverse",
        forward_endpoint: "https://nominatim.openstreetmap.org/search",
        reverse_params: nominatim_reverse_params,
        forward_params: nominatim_forward_params,
        first_result: nominatim_first_result,
        flatten: nominatim_flatten,
        chains: NOMINATIM_CHAINS,
    },
    GeocodeVendor {
        slug: "locationiq",
        name: "LocationIQ",
        requires_key: true,
        key_param: Some("key"),
        reverse_endpoint: "https://us1.locationiq.com/v1/reverse",
        forward_endpoint: "https://us1.locationiq.com/v1/search",
        reverse_params: nominatim_reverse_params,
        forward_params: nominatim_forward_params,
        first_result: nominatim_first_result,
        flatten: nominatim_flatten,
        chains: NOMINATIM_CHAINS,
    },
    GeocodeVendor {
        slug: "opencage",
        name: "OpenCage",
        requires_key: true,
        key_param: Some("key"),
        reverse_endpoint: "https://api.opencagedata.com/geocode/v1/json",
        forward_endpoint: "https://api.opencagedata.com/geocode/v1/json",
        reverse_params: opencage_reverse_params,
        forward_params: opencage_forward_params,
        first_result: opencage_first_result,
        flatten: opencage_flatten,
        chains: OPENCAGE_CHAINS,
    },
    GeocodeVendor {
        slug: "google",
        name: "Google Maps Geocoding",
        requires_key: true,
        key_param: Some("key"),
        reverse_endpoint: "https://maps.googleapis.com/maps/api/geocode/json",
        forward_endpoint: "https://maps.googleapis.com/maps/api/geocode/json",
        reverse_params: google_reverse_params,
        forward_params: google_forward_params,
        first_result: google_first_result,
        flatten: google_flatten,
        chains: GOOGLE_CHAINS,
    },
    GeocodeVendor {
        slug: "bing",
        name: "Bing Maps Locations",
        requires_key: true,
        key_param: Some("key"),
        reverse_endpoint: "https://dev.virtualearth.net/REST/v1/Locations/{lat},{lon}",
        forward_endpoint: "https://dev.virtualearth.net/REST/v1/Locations",
        reverse_params: bing_reverse_params,
        forward_params: bing_forward_params,
        first_result: bing_first_result,
        flatten: bing_flatten,
        chains: BING_CHAINS,
    },
    GeocodeVendor {
        slug: "here",
        name: "HERE Geocoding & Search",
        requires_key: true,
        key_param: Some("apiKey"),
        reverse_endpoint: "https://revgeocode.search.hereapi.com/v1/revgeocode",
        forward_endpoint: "https://geocode.search.hereapi.com/v1/geocode",
        reverse_params: here_reverse_params,
        forward_params: here_forward_params,
        first_result: here_first_result,
        flatten: here_flatten,
        chains: HERE_CHAINS,
    },
    GeocodeVendor {
        slug: "mapquest",
        name: "MapQuest Geocoding",
        requires_key: true,
        key_param: Some("key"),
        reverse_endpoint: "https://www.mapquestapi.com/geocoding/v1/reverse",
        forward_endpoint: "https://www.mapquestapi.com/geocoding/v1/address",
        reverse_params: mapquest_reverse_params,
        forward_params: mapquest_forward_params,
        first_result: mapquest_first_result,
        flatten: mapquest_flatten,
        chains: MAPQUEST_CHAINS,
    },
    GeocodeVendor {
        slug: "geonames",
        name: "GeoNames",
        requires_key: true,
        key_param: Some("username"),
        reverse_endpoint: "https://secure.geonames.org/findNearbyPlaceNameJSON",
        forward_endpoint: "https://secure.geonames.org/searchJSON",
        reverse_params: geonames_reverse_params,
        forward_params: geonames_forward_params,
        first_result: geonames_first_result,
        flatten: geonames_flatten,
        chains: GEONAMES_CHAINS,
    },
];

/// Look up a vendor record by slug
#[must_use]
pub fn vendor_by_slug(slug: &str) -> Option<&'static GeocodeVendor> {
    GEOCODE_VENDORS.iter().find(|vendor| vendor.slug == slug)
}
