//! Recursive stripping of nulls and the empty containers they leave behind.

use serde_json::{Map, Value};

/// Remove every null and every empty object/array from `value`, depth-first.
///
/// Runs as the last step before a payload is serialized and sent, after
/// redaction, so destinations never see `null` placeholders for fields the
/// builder could not resolve. A root that cleans away entirely collapses to
/// an empty object.
pub fn deep_clean(value: Value) -> Value {
    clean(value).unwrap_or(Value::Object(Map::new()))
}

fn clean(value: Value) -> Option<Value> {
    match value {
        Value::Null => None,
        Value::Object(map) => {
            let cleaned: Map<String, Value> = map
                .into_iter()
                .filter_map(|(key, value)| clean(value).map(|value| (key, value)))
                .collect();
            if cleaned.is_empty() {
                None
            } else {
                Some(Value::Object(cleaned))
            }
        }
        Value::Array(items) => {
            let cleaned: Vec<Value> = items.into_iter().filter_map(clean).collect();
            if cleaned.is_empty() {
                None
            } else {
                Some(Value::Array(cleaned))
            }
        }
        scalar => Some(scalar),
    }
}
