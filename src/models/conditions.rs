//! Canonical weather conditions record and the shared condition-code taxonomy

use crate::units;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Sentinel for vendor values outside the vendor's mapping table
pub const CONDITION_UNKNOWN: u16 = 0;

/// Wind measurements, SI units
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct Wind {
    /// Speed in m/s
    pub speed: Option<f64>,
    /// Direction the wind comes from, degrees 0-360
    pub degree: Option<f64>,
    /// Gust speed in m/s
    pub gust: Option<f64>,
}

/// Normalized weather snapshot
///
/// All linear and speed quantities are SI (°C, hPa, m/s, mm, m). Conversion
/// to imperial happens at presentation time via [`CanonicalConditions::imperial`]
/// and never mutates the stored record.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct CanonicalConditions {
    /// Air temperature in °C
    pub temperature: Option<f64>,
    /// Dew point in °C
    pub dewpoint: Option<f64>,
    /// Relative humidity, percent
    pub humidity: Option<f64>,
    /// Pressure in hPa
    pub pressure: Option<f64>,
    /// Cloud cover, percent
    pub cloudiness: Option<f64>,
    /// Human-readable summary
    pub summary: Option<String>,
    /// Shared vendor-independent condition code
    pub code: u16,
    pub wind: Wind,
    /// Rain over the reference period, mm
    pub rain: Option<f64>,
    /// Snow over the reference period, mm
    pub snow: Option<f64>,
    /// Visibility in meters
    pub visibility: Option<f64>,
    /// UV index
    pub uv: Option<f64>,
    /// Observing station, when resolved via nearest-station search
    pub station_id: Option<String>,
    /// Meters from the requested point to the station
    pub distance: Option<f64>,
    /// Observation or forecast-bucket time, Unix seconds
    pub observed_at: Option<i64>,
    /// Raw vendor payload, populated only under the debug flag
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<Value>,
}

/// Imperial-facing view of a conditions record
#[derive(Debug, Clone, PartialEq)]
pub struct ImperialConditions {
    /// Temperature in °F
    pub temperature: Option<f64>,
    /// Dew point in °F
    pub dewpoint: Option<f64>,
    /// Wind speed in mph
    pub wind_speed: Option<f64>,
    /// Gust speed in mph
    pub wind_gust: Option<f64>,
    /// Visibility in miles
    pub visibility: Option<f64>,
}

impl CanonicalConditions {
    /// Presentation-time imperial conversion; the record itself stays SI
    #[must_use]
    pub fn imperial(&self) -> ImperialConditions {
        ImperialConditions {
            temperature: self.temperature.map(units::c_to_f),
            dewpoint: self.dewpoint.map(units::c_to_f),
            wind_speed: self.wind.speed.map(units::ms_to_mph),
            wind_gust: self.wind.gust.map(units::ms_to_mph),
            visibility: self.visibility.map(units::m_to_mi),
        }
    }

    /// Fill the summary from the shared taxonomy when the vendor gave none
    pub fn ensure_summary(&mut self) {
        if self.summary.is_none() && self.code != CONDITION_UNKNOWN {
            self.summary = Some(condition_summary(self.code).to_string());
        }
    }
}

/// Human-readable summary for a shared condition code
///
/// The code space follows the common 3-digit convention: 2xx thunderstorm,
/// 3xx drizzle, 5xx rain, 6xx snow, 7xx atmosphere, 800 clear, 80x clouds.
#[must_use]
pub fn condition_summary(code: u16) -> &'static str {
    match code {
        200 => "Thunderstorm with light rain",
        201 => "Thunderstorm with rain",
        202 => "Thunderstorm with heavy rain",
        210 => "Light thunderstorm",
        211 => "Thunderstorm",
        212 => "Heavy thunderstorm",
        221 => "Ragged thunderstorm",
        230 => "Thunderstorm with light drizzle",
        231 => "Thunderstorm with drizzle",
        232 => "Thunderstorm with heavy drizzle",
        300 => "Light drizzle",
        301 => "Drizzle",
        302 => "Heavy drizzle",
        310 => "Light drizzle rain",
        311 => "Drizzle rain",
        312 => "Heavy drizzle rain",
        313 => "Shower rain and drizzle",
        314 => "Heavy shower rain and drizzle",
        321 => "Shower drizzle",
        500 => "Light rain",
        501 => "Moderate rain",
        502 => "Heavy rain",
        503 => "Very heavy rain",
        504 => "Extreme rain",
        511 => "Freezing rain",
        520 => "Light shower rain",
        521 => "Shower rain",
        522 => "Heavy shower rain",
        531 => "Ragged shower rain",
        600 => "Light snow",
        601 => "Snow",
        602 => "Heavy snow",
        611 => "Sleet",
        612 => "Light shower sleet",
        613 => "Shower sleet",
        615 => "Light rain and snow",
        616 => "Rain and snow",
        620 => "Light shower snow",
        621 => "Shower snow",
        622 => "Heavy shower snow",
        701 => "Mist",
        711 => "Smoke",
        721 => "Haze",
        731 => "Dust whirls",
        741 => "Fog",
        751 => "Sand",
        761 => "Dust",
        762 => "Volcanic ash",
        771 => "Squalls",
        781 => "Tornado",
        800 => "Clear sky",
        801 => "Few clouds",
        802 => "Scattered clouds",
        803 => "Broken clouds",
        804 => "Overcast clouds",
        _ => "Unknown",
    }
}

/// Convert wind direction in degrees to a cardinal label
#[must_use]
pub fn wind_direction_to_cardinal(degrees: f64) -> &'static str {
    let normalized = degrees.rem_euclid(360.0);
    let sector = ((normalized + 11.25) / 22.5) as usize % 16;
    [
        "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW",
        "WSW", "W", "WNW", "NW", "NNW",
    ][sector]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_imperial_view_does_not_mutate() {
        let conditions = CanonicalConditions {
            temperature: Some(0.0),
            wind: Wind {
                speed: Some(10.0),
                degree: Some(180.0),
                gust: None,
            },
            visibility: Some(1609.344),
            ..Default::default()
        };
        let imperial = conditions.imperial();
        assert!((imperial.temperature.unwrap() - 32.0).abs() < 1e-9);
        assert!((imperial.visibility.unwrap() - 1.0).abs() < 1e-9);
        // SI record untouched
        assert_eq!(conditions.temperature, Some(0.0));
        assert_eq!(conditions.wind.speed, Some(10.0));
    }

    #[test]
    fn test_condition_summary_taxonomy() {
        assert_eq!(condition_summary(800), "Clear sky");
        assert_eq!(condition_summary(211), "Thunderstorm");
        assert_eq!(condition_summary(601), "Snow");
        assert_eq!(condition_summary(CONDITION_UNKNOWN), "Unknown");
        assert_eq!(condition_summary(999), "Unknown");
    }

    #[test]
    fn test_ensure_summary() {
        let mut conditions = CanonicalConditions {
            code: 500,
            ..Default::default()
        };
        conditions.ensure_summary();
        assert_eq!(conditions.summary.as_deref(), Some("Light rain"));

        let mut unknown = CanonicalConditions::default();
        unknown.ensure_summary();
        assert!(unknown.summary.is_none());
    }

    #[test]
    fn test_wind_cardinal() {
        assert_eq!(wind_direction_to_cardinal(0.0), "N");
        assert_eq!(wind_direction_to_cardinal(359.0), "N");
        assert_eq!(wind_direction_to_cardinal(90.0), "E");
        assert_eq!(wind_direction_to_cardinal(225.0), "SW");
    }
}
