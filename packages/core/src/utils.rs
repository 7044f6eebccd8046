// ABOUTME: Helpers for reading values out of arbitrary JSON payloads
// ABOUTME: Field lookup and scalar comparison shared by status checks and metric rows

use serde_json::Value;

/// Look up `field` in a JSON payload: a literal top-level key wins, otherwise
/// the field is treated as a dotted path (`queue.depth`, `items.0.name`)
pub fn lookup_field<'a>(payload: &'a Value, field: &str) -> Option<&'a Value> {
    if let Some(value) = payload.get(field) {
        return Some(value);
    }
    if !field.contains('.') {
        return None;
    }

    field.split('.').try_fold(payload, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// Text form of a scalar JSON value; objects, arrays and null have none
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Exact comparison of a JSON scalar against a configured expected value
pub fn scalar_matches(value: &Value, expected: &str) -> bool {
    scalar_text(value).is_some_and(|text| text == expected)
}
