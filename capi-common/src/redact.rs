//! Best-effort deletion of payload fields addressed by dot-separated paths.

use serde_json::Value;

/// Return a copy of `payload` with the leaf addressed by each path removed.
///
/// Any path segment that resolves to an array fans the remaining suffix out
/// to every element, so `events.event_metadata.item_count` removes the key
/// from each object in an `events` array. Paths with missing intermediate
/// keys are ignored; redaction never fails and never mutates its input.
pub fn redact_paths(payload: &Value, paths: &[&str]) -> Value {
    let mut copy = payload.clone();
    for path in paths {
        let segments: Vec<&str> = path.split('.').filter(|s| !s.is_empty()).collect();
        if !segments.is_empty() {
            remove_path(&mut copy, &segments);
        }
    }
    copy
}

fn remove_path(value: &mut Value, segments: &[&str]) {
    match value {
        Value::Array(items) => {
            for item in items {
                remove_path(item, segments);
            }
        }
        Value::Object(map) => {
            if segments.len() == 1 {
                map.remove(segments[0]);
            } else if let Some(next) = map.get_mut(segments[0]) {
                remove_path(next, &segments[1..]);
            }
        }
        // Scalars cannot be descended into; the path simply does not resolve.
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_removes_nested_leaf() {
        let payload = json!({"user": {"email": "x", "name": "y"}});
        let redacted = redact_paths(&payload, &["user.email"]);
        assert_eq!(redacted, json!({"user": {"name": "y"}}));
    }

    #[test]
    fn test_fans_out_across_array_elements() {
        let payload = json!({
            "events": [
                {"event_metadata": {"item_count": 5, "currency": "USD"}},
                {"event_metadata": {"item_count": 2}},
            ]
        });
        let redacted = redact_paths(&payload, &["events.event_metadata.item_count"]);
        assert_eq!(
            redacted,
            json!({
                "events": [
                    {"event_metadata": {"currency": "USD"}},
                    {"event_metadata": {}},
                ]
            })
        );
    }

    #[test]
    fn test_missing_path_is_a_no_op() {
        let payload = json!({"a": {"b": 1}});
        assert_eq!(redact_paths(&payload, &["a.c.d", "x.y"]), payload);
    }

    #[test]
    fn test_does_not_mutate_input() {
        let payload = json!({"a": {"b": 1}});
        let _unused = redact_paths(&payload, &["a.b"]);
        assert_eq!(payload, json!({"a": {"b": 1}}));
    }

    #[test]
    fn test_path_through_scalar_is_ignored() {
        let payload = json!({"a": 3});
        assert_eq!(redact_paths(&payload, &["a.b"]), payload);
    }

    #[test]
    fn test_multiple_paths_apply_independently() {
        let payload = json!({"a": 1, "b": {"c": 2, "d": 3}});
        let redacted = redact_paths(&payload, &["a", "b.d"]);
        assert_eq!(redacted, json!({"b": {"c": 2}}));
    }
}
