//! Fallback field resolution over raw vendor payloads
//!
//! Vendors name semantically-equivalent fields differently; callers hand the
//! resolver an ordered candidate list and get the first usable value back.
//! Presence and emptiness are separate checks: `null` and `""` count as
//! empty, but `0`, `0.0`, and `false` are real values (an altitude of zero
//! is data, not absence).

use serde_json::Value;

/// True when a present value carries no information
#[must_use]
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// Return the first candidate key present in `record` with a non-empty value
#[must_use]
pub fn resolve<'a>(record: &'a Value, candidates: &[&str]) -> Option<&'a Value> {
    let map = record.as_object()?;
    for key in candidates {
        if let Some(value) = map.get(*key) {
            if !is_empty_value(value) {
                return Some(value);
            }
        }
    }
    None
}

/// Resolve to an owned string, accepting strings and numbers
#[must_use]
pub fn resolve_string(record: &Value, candidates: &[&str]) -> Option<String> {
    match resolve(record, candidates)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Resolve to a float, accepting numbers and numeric strings
#[must_use]
pub fn resolve_f64(record: &Value, candidates: &[&str]) -> Option<f64> {
    match resolve(record, candidates)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// Walk a nested path of object keys / array indices
#[must_use]
pub fn dig<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut current = value;
    for segment in path {
        current = match current {
            Value::Object(map) => map.get(*segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Walk a nested path, then require a non-empty string
#[must_use]
pub fn dig_string(value: &Value, path: &[&str]) -> Option<String> {
    let found = dig(value, path)?;
    if is_empty_value(found) {
        return None;
    }
    match found {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Walk a nested path, then require a float
#[must_use]
pub fn dig_f64(value: &Value, path: &[&str]) -> Option<f64> {
    match dig(value, path)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resolve_first_match_wins() {
        let record = json!({"city": "Ottawa", "town": "Nepean"});
        let v = resolve(&record, &["city", "town"]).unwrap();
        assert_eq!(v, "Ottawa");
    }

    #[test]
    fn test_resolve_skips_empty_and_null() {
        let record = json!({"city": "", "town": null, "village": "Vanier"});
        let v = resolve_string(&record, &["city", "town", "village"]).unwrap();
        assert_eq!(v, "Vanier");
    }

    #[test]
    fn test_resolve_zero_is_a_value() {
        // Altitude 0 must not be dropped as absent
        let record = json!({"altitude": 0, "elevation": 150.0});
        let v = resolve_f64(&record, &["altitude", "elevation"]).unwrap();
        assert_eq!(v, 0.0);
    }

    #[test]
    fn test_resolve_false_is_a_value() {
        let record = json!({"flag": false, "other": true});
        let v = resolve(&record, &["flag", "other"]).unwrap();
        assert_eq!(v, &json!(false));
    }

    #[test]
    fn test_resolve_string_zero_is_a_value() {
        let record = json!({"house_number": "0"});
        let v = resolve_string(&record, &["house_number"]).unwrap();
        assert_eq!(v, "0");
    }

    #[test]
    fn test_resolve_none_when_all_absent() {
        let record = json!({"a": null, "b": ""});
        assert!(resolve(&record, &["a", "b", "c"]).is_none());
        assert!(resolve(&json!("not an object"), &["a"]).is_none());
    }

    #[test]
    fn test_resolve_numeric_string_coercion() {
        let record = json!({"lat": "45.4215"});
        assert_eq!(resolve_f64(&record, &["lat"]).unwrap(), 45.4215);
        let record = json!({"postcode": 90210});
        assert_eq!(resolve_string(&record, &["postcode"]).unwrap(), "90210");
    }

    #[test]
    fn test_dig_nested() {
        let payload = json!({
            "resourceSets": [{"resources": [{"address": {"locality": "Ottawa"}}]}]
        });
        let v = dig_string(
            &payload,
            &["resourceSets", "0", "resources", "0", "address", "locality"],
        )
        .unwrap();
        assert_eq!(v, "Ottawa");
        assert!(dig(&payload, &["resourceSets", "1"]).is_none());
        assert!(dig(&payload, &["missing"]).is_none());
    }
}
