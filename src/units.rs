//! Unit conversions between metric, imperial, and nautical quantities
//!
//! Canonical records store SI units only; these functions are applied at
//! presentation time and never mutate a stored value.

/// Convert kilometers per hour to meters per second
#[must_use]
pub fn kmh_to_ms(kmh: f64) -> f64 {
    kmh / 3.6
}

/// Convert meters per second to kilometers per hour
#[must_use]
pub fn ms_to_kmh(ms: f64) -> f64 {
    ms * 3.6
}

/// Convert miles per hour to meters per second
#[must_use]
pub fn mph_to_ms(mph: f64) -> f64 {
    mph * 0.447_04
}

/// Convert meters per second to miles per hour
#[must_use]
pub fn ms_to_mph(ms: f64) -> f64 {
    ms / 0.447_04
}

/// Convert knots to meters per second
#[must_use]
pub fn knots_to_ms(knots: f64) -> f64 {
    knots * 0.514_444
}

/// Convert meters per second to knots
#[must_use]
pub fn ms_to_knots(ms: f64) -> f64 {
    ms / 0.514_444
}

/// Convert kilometers to meters
#[must_use]
pub fn km_to_m(km: f64) -> f64 {
    km * 1000.0
}

/// Convert meters to kilometers
#[must_use]
pub fn m_to_km(m: f64) -> f64 {
    m / 1000.0
}

/// Convert miles to meters
#[must_use]
pub fn mi_to_m(mi: f64) -> f64 {
    mi * 1609.344
}

/// Convert meters to miles
#[must_use]
pub fn m_to_mi(m: f64) -> f64 {
    m / 1609.344
}

/// Convert centimeters to millimeters
#[must_use]
pub fn cm_to_mm(cm: f64) -> f64 {
    cm * 10.0
}

/// Convert millimeters to centimeters
#[must_use]
pub fn mm_to_cm(mm: f64) -> f64 {
    mm / 10.0
}

/// Convert inches to millimeters
#[must_use]
pub fn in_to_mm(inches: f64) -> f64 {
    inches * 25.4
}

/// Convert feet to meters
#[must_use]
pub fn ft_to_m(ft: f64) -> f64 {
    ft * 0.3048
}

/// Convert meters to feet
#[must_use]
pub fn m_to_ft(m: f64) -> f64 {
    m / 0.3048
}

/// Convert Celsius to Fahrenheit
#[must_use]
pub fn c_to_f(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

/// Convert Fahrenheit to Celsius
#[must_use]
pub fn f_to_c(fahrenheit: f64) -> f64 {
    (fahrenheit - 32.0) * 5.0 / 9.0
}

/// Convert Kelvin to Celsius
#[must_use]
pub fn kelvin_to_c(kelvin: f64) -> f64 {
    kelvin - 273.15
}
