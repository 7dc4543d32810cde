//! Payload Shape Coercion
//!
//! The upstream wraps list payloads inconsistently: sometimes a bare array,
//! sometimes `{data: [...]}`, `{list: [...]}`, `{result: {items: [...]}}`
//! and so on. This module extracts the inner sequence with a best-effort,
//! two-level-deep key search. It never errors: anything deeper or shaped
//! differently degrades to an empty list.

use serde_json::Value;

/// Wrapper keys checked in priority order
const WRAPPER_KEYS: [&str; 8] = [
    "data",
    "list",
    "result",
    "items",
    "rows",
    "books",
    "chapters",
    "chapterList",
];

/// Container keys whose object value gets one nested key search
const NESTED_KEYS: [&str; 2] = ["data", "result"];

/// Extract the payload sequence from an inconsistently-wrapped value.
///
/// Resolution order: the value itself if it is an array; the first
/// array-valued wrapper key; the first array-valued wrapper key inside an
/// object under `data` or `result`; otherwise empty.
pub fn coerce_to_list(raw: Value) -> Vec<Value> {
    let mut map = match raw {
        Value::Array(items) => return items,
        Value::Object(map) => map,
        _ => return Vec::new(),
    };

    for key in WRAPPER_KEYS {
        if matches!(map.get(key), Some(Value::Array(_))) {
            if let Some(Value::Array(items)) = map.remove(key) {
                return items;
            }
        }
    }

    for outer in NESTED_KEYS {
        if let Some(Value::Object(inner)) = map.get_mut(outer) {
            for key in WRAPPER_KEYS {
                if matches!(inner.get(key), Some(Value::Array(_))) {
                    if let Some(Value::Array(items)) = inner.remove(key) {
                        return items;
                    }
                }
            }
        }
    }

    Vec::new()
}
