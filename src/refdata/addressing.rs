//! Street-address composition conventions per country
//!
//! Whether the house number precedes the street name ("221B Baker Street")
//! or follows it ("Musterstrasse 12") is a per-country postal convention.
//! Unlisted countries default to number-before-street.

/// Countries writing the house number after the street name
const NUMBER_AFTER_STREET: &[&str] = &[
    "AR", "AT", "BE", "BG", "BO", "BR", "CH", "CL", "CO", "CZ", "DE", "DK",
    "EC", "EE", "ES", "FI", "GR", "HR", "HU", "ID", "IL", "IS", "IT", "LI",
    "LT", "LV", "MK", "MX", "NL", "NO", "PE", "PL", "PT", "PY", "RO", "RS",
    "RU", "SE", "SI", "SK", "TR", "UA", "UY", "VE",
];

/// True when the house number is written before the street name
#[must_use]
pub fn house_number_first(country: &str) -> bool {
    let upper = country.to_ascii_uppercase();
    !NUMBER_AFTER_STREET.contains(&upper.as_str())
}

/// Compose a street address from a street name and an optional house number,
/// honoring the country's ordering convention
#[must_use]
pub fn compose_street_address(
    country: &str,
    street: &str,
    number: Option<&str>,
) -> String {
    match number {
        Some(number) if !number.is_empty() => {
            if house_number_first(country) {
                format!("{number} {street}")
            } else {
                format!("{street} {number}")
            }
        }
        _ => street.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_first_countries() {
        assert!(house_number_first("US"));
        assert!(house_number_first("GB"));
        assert!(house_number_first("FR"));
        assert!(house_number_first("CA"));
        assert!(house_number_first("AU"));
    }

    #[test]
    fn test_number_after_countries() {
        assert!(!house_number_first("DE"));
        assert!(!house_number_first("de"));
        assert!(!house_number_first("NL"));
        assert!(!house_number_first("ES"));
        assert!(!house_number_first("BR"));
    }

    #[test]
    fn test_unlisted_defaults_to_number_first() {
        assert!(house_number_first("JP"));
        assert!(house_number_first("ZZ"));
    }

    #[test]
    fn test_compose_street_address() {
        assert_eq!(
            compose_street_address("US", "Main Street", Some("12")),
            "12 Main Street"
        );
        assert_eq!(
            compose_street_address("DE", "Musterstrasse", Some("12")),
            "Musterstrasse 12"
        );
        assert_eq!(compose_street_address("US", "Main Street", None), "Main Street");
        assert_eq!(compose_street_address("DE", "Musterstrasse", Some("")), "Musterstrasse");
    }
}
