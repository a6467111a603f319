//! Generic address-normalization engine
//!
//! Each vendor is a [`GeocodeVendor`] record: endpoint templates, an envelope
//! validator, a flattener that reshapes the vendor's result into one flat
//! JSON object, and ordered fallback chains naming where each canonical field
//! lives in that object. The pipeline below is shared by every vendor:
//! validate, extract the country, resolve fields through the chains, compose
//! the street address by country convention, derive the region code, and
//! synthesize a display name when the vendor gave none.

use crate::error::{Error, Result};
use crate::fallback::{resolve_f64, resolve_string};
use crate::models::{CanonicalAddress, Coordinate};
use crate::refdata;
use chrono::{Offset, TimeZone, Utc};
use serde_json::Value;
use tracing::debug;

/// Ordered candidate-key chains for every canonical address field
///
/// An empty chain means the vendor never carries that field.
pub struct AddressChains {
    pub name: &'static [&'static str],
    /// Pre-composed street line, preferred over composition when present
    pub street_address: &'static [&'static str],
    pub street_number: &'static [&'static str],
    pub street: &'static [&'static str],
    pub extended: &'static [&'static str],
    pub locality: &'static [&'static str],
    pub region: &'static [&'static str],
    /// Alternate region ordering applied for `state_first_countries`
    pub region_state_first: &'static [&'static str],
    /// Countries whose admin hierarchy prefers state/county first
    pub state_first_countries: &'static [&'static str],
    pub region_code: &'static [&'static str],
    pub postal_code: &'static [&'static str],
    pub country_code: &'static [&'static str],
    pub country_name: &'static [&'static str],
    pub display_name: &'static [&'static str],
    pub latitude: &'static [&'static str],
    pub longitude: &'static [&'static str],
    pub altitude: &'static [&'static str],
    pub url: &'static [&'static str],
    pub photo: &'static [&'static str],
    pub timezone: &'static [&'static str],
}

/// One vendor's configuration, consumed by the shared engine
pub struct GeocodeVendor {
    pub slug: &'static str,
    pub name: &'static str,
    pub requires_key: bool,
    /// Query parameter carrying the credential, when not embedded in the path
    pub key_param: Option<&'static str>,
    /// Reverse endpoint; `{lat}`/`{lon}`/`{key}` placeholders are substituted
    pub reverse_endpoint: &'static str,
    /// Forward endpoint; `{query}`/`{key}` placeholders are substituted
    pub forward_endpoint: &'static str,
    /// Extra query parameters for a reverse lookup
    pub reverse_params: fn(&Coordinate) -> Vec<(&'static str, String)>,
    /// Extra query parameters for a forward lookup
    pub forward_params: fn(&str) -> Vec<(&'static str, String)>,
    /// Validate the envelope and return the first result record
    pub first_result: fn(&Value) -> Result<Value>,
    /// Reshape a result record into one flat object for the chains
    pub flatten: fn(&Value) -> Value,
    pub chains: AddressChains,
}

/// Substitute endpoint placeholders
pub fn fill_template(template: &str, pairs: &[(&str, &str)]) -> String {
    let mut url = template.to_string();
    for (placeholder, value) in pairs {
        url = url.replace(&format!("{{{placeholder}}}"), value);
    }
    url
}

/// Run the shared normalization pipeline over a raw vendor payload
pub fn normalize(
    vendor: &GeocodeVendor,
    raw: &Value,
    requested: Option<&Coordinate>,
    debug_payload: bool,
) -> Result<CanonicalAddress> {
    // 1. Envelope validation; vendors signal "no results" in their own way
    let result = (vendor.first_result)(raw)?;
    let flat = (vendor.flatten)(&result);

    // 2. Country, normalized to ISO 3166-1 alpha-2 whatever the vendor sent
    let country_code = resolve_string(&flat, vendor.chains.country_code)
        .and_then(|raw_code| refdata::normalize_country(&raw_code))
        .or_else(|| {
            resolve_string(&flat, vendor.chains.country_name)
                .and_then(|name| refdata::alpha2_from_name(&name).map(str::to_string))
        });
    let country_name = resolve_string(&flat, vendor.chains.country_name).or_else(|| {
        country_code
            .as_deref()
            .and_then(refdata::country_name)
            .map(str::to_string)
    });

    // 3. Field resolution through the fallback chains; the region chain is
    //    reordered for countries that put state/county ahead of districts
    let region_chain = match &country_code {
        Some(code)
            if vendor
                .chains
                .state_first_countries
                .contains(&code.as_str()) =>
        {
            vendor.chains.region_state_first
        }
        _ => vendor.chains.region,
    };

    let name = resolve_string(&flat, vendor.chains.name);
    let locality = resolve_string(&flat, vendor.chains.locality);
    let mut region = resolve_string(&flat, region_chain);
    let mut region_code = resolve_string(&flat, vendor.chains.region_code);
    let street = resolve_string(&flat, vendor.chains.street);
    let street_number = resolve_string(&flat, vendor.chains.street_number);
    let extended_address = resolve_string(&flat, vendor.chains.extended);
    let postal_code = resolve_string(&flat, vendor.chains.postal_code);

    // 4. Street address: the vendor's own line when it has one, otherwise
    //    composed by the country's number-order convention
    let street_address = resolve_string(&flat, vendor.chains.street_address)
        .or_else(|| {
            street.as_deref().map(|street| {
                refdata::compose_street_address(
                    country_code.as_deref().unwrap_or(""),
                    street,
                    street_number.as_deref(),
                )
            })
        });

    // 5. Region code derivation, best-effort in both directions. A vendor
    //    "region" that is really a subdivision code gets swapped for its name.
    if let Some(code) = country_code.clone() {
        if region_code.is_none() {
            if let Some(r) = region.clone() {
                if r.len() <= 3 && refdata::region_name(&code, &r).is_some() {
                    region = refdata::region_name(&code, &r).map(str::to_string);
                    region_code = Some(r.to_uppercase());
                } else {
                    region_code = refdata::region_code(&code, &r).map(str::to_string);
                }
            }
        }
        if region.is_none() {
            if let Some(rc) = region_code.clone() {
                region = refdata::region_name(&code, &rc).map(str::to_string);
            }
        }
        if let (Some(r), Some(rc)) = (region.clone(), region_code.clone()) {
            match refdata::region_name(&code, &rc) {
                Some(resolved) if resolved.eq_ignore_ascii_case(&r) => {}
                _ => debug!(
                    "region code '{rc}' does not round-trip to '{r}' for {code}"
                ),
            }
        }
    }

    let latitude = resolve_f64(&flat, vendor.chains.latitude)
        .or(requested.map(|c| c.latitude));
    let longitude = resolve_f64(&flat, vendor.chains.longitude)
        .or(requested.map(|c| c.longitude));
    let altitude = resolve_f64(&flat, vendor.chains.altitude)
        .or(requested.and_then(|c| c.altitude));

    // 6. Timezone merge, with the UTC offset derived from the IANA name
    let timezone = resolve_string(&flat, vendor.chains.timezone);
    let utc_offset_secs = timezone.as_deref().and_then(utc_offset_for);

    let mut address = CanonicalAddress {
        name,
        street_address,
        street,
        street_number,
        extended_address,
        locality,
        region,
        region_code,
        country_name,
        country_code,
        postal_code,
        display_name: resolve_string(&flat, vendor.chains.display_name)
            .unwrap_or_default(),
        latitude,
        longitude,
        altitude,
        url: resolve_string(&flat, vendor.chains.url),
        photo: resolve_string(&flat, vendor.chains.photo),
        timezone,
        utc_offset_secs,
        raw: None,
    };

    // 7. A successful normalization always carries a display name
    address.ensure_display_name();
    if address.display_name.is_empty() {
        return Err(Error::malformed(format!(
            "{} result had no displayable fields",
            vendor.slug
        )));
    }

    if debug_payload {
        address.raw = Some(raw.clone());
    }
    Ok(address)
}

fn utc_offset_for(tz_name: &str) -> Option<i32> {
    let tz: chrono_tz::Tz = tz_name.parse().ok()?;
    let offset = tz
        .offset_from_utc_datetime(&Utc::now().naive_utc())
        .fix()
        .local_minus_utc();
    Some(offset)
}
