//! Dotted-path access and deep merge over JSON values

use serde_json::Value as JsonValue;

use crate::error::{CoreError, Result};

/// Split a dotted path (`a.b.c`) into its segments
///
/// An empty path yields no segments and addresses the value itself.
pub fn split_path(path: &str) -> Vec<&str> {
    if path.is_empty() {
        Vec::new()
    } else {
        path.split('.').collect()
    }
}

/// Deep merge two JSON values
///
/// Rules:
/// - Scalars: overlay replaces base
/// - Objects: recursive merge
/// - Arrays: overlay replaces base (not appended)
pub fn deep_merge(base: &mut JsonValue, overlay: &JsonValue) {
    match (base, overlay) {
        (JsonValue::Object(base_map), JsonValue::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                match base_map.get_mut(key) {
                    Some(base_value) => deep_merge(base_value, overlay_value),
                    None => {
                        base_map.insert(key.clone(), overlay_value.clone());
                    }
                }
            }
        }
        (base, overlay) => {
            *base = overlay.clone();
        }
    }
}

/// Set a nested value by path, creating intermediate objects
pub fn set_nested(value: &mut JsonValue, path: &[&str], new_value: JsonValue) {
    let Some((key, remaining)) = path.split_first() else {
        *value = new_value;
        return;
    };

    if !value.is_object() {
        *value = JsonValue::Object(serde_json::Map::new());
    }

    if let JsonValue::Object(map) = value {
        if remaining.is_empty() {
            map.insert((*key).to_string(), new_value);
        } else {
            let entry = map
                .entry((*key).to_string())
                .or_insert_with(|| JsonValue::Object(serde_json::Map::new()));
            set_nested(entry, remaining, new_value);
        }
    }
}

/// Get a nested value by path
///
/// Numeric segments index into arrays (`items.0.metadata`).
pub fn get_nested<'a>(value: &'a JsonValue, path: &[&str]) -> Option<&'a JsonValue> {
    let Some((key, remaining)) = path.split_first() else {
        return Some(value);
    };

    match value {
        JsonValue::Object(map) => map.get(*key).and_then(|v| get_nested(v, remaining)),
        JsonValue::Array(items) => key
            .parse::<usize>()
            .ok()
            .and_then(|index| items.get(index))
            .and_then(|v| get_nested(v, remaining)),
        _ => None,
    }
}

/// Append to the array stored at `path`, creating it when absent
///
/// With `spread` set and an array `new_value`, its elements are appended
/// one by one instead of the array itself.
pub fn push_nested(
    value: &mut JsonValue,
    path: &[&str],
    new_value: JsonValue,
    spread: bool,
) -> Result<()> {
    if matches!(get_nested(value, path), None | Some(JsonValue::Null)) {
        set_nested(value, path, JsonValue::Array(Vec::new()));
    }

    let Some(JsonValue::Array(items)) = get_nested_mut(value, path) else {
        return Err(CoreError::NotAnArray {
            path: path.join("."),
        });
    };

    match new_value {
        JsonValue::Array(elements) if spread => items.extend(elements),
        other => items.push(other),
    }

    Ok(())
}

fn get_nested_mut<'a>(value: &'a mut JsonValue, path: &[&str]) -> Option<&'a mut JsonValue> {
    let Some((key, remaining)) = path.split_first() else {
        return Some(value);
    };

    match value {
        JsonValue::Object(map) => map.get_mut(*key).and_then(|v| get_nested_mut(v, remaining)),
        JsonValue::Array(items) => key
            .parse::<usize>()
            .ok()
            .and_then(|index| items.get_mut(index))
            .and_then(|v| get_nested_mut(v, remaining)),
        _ => None,
    }
}

/// Parse `key=value` assignments into a JSON object
///
/// Values are typed the same way a YAML scalar would be: `true`/`false`,
/// `null`, integers and floats, inline JSON arrays/objects, else strings.
pub fn parse_set_values(set_args: &[String]) -> Result<JsonValue> {
    let mut values = JsonValue::Object(serde_json::Map::new());

    for arg in set_args {
        let (key, val) = arg
            .split_once('=')
            .ok_or_else(|| CoreError::InvalidAssignment { arg: arg.clone() })?;

        let json_value = if val == "true" {
            JsonValue::Bool(true)
        } else if val == "false" {
            JsonValue::Bool(false)
        } else if val == "null" {
            JsonValue::Null
        } else if let Ok(num) = val.parse::<i64>() {
            JsonValue::Number(num.into())
        } else if let Ok(num) = val.parse::<f64>() {
            serde_json::Number::from_f64(num)
                .map(JsonValue::Number)
                .unwrap_or_else(|| JsonValue::String(val.to_string()))
        } else if val.starts_with('[') || val.starts_with('{') {
            serde_json::from_str(val).unwrap_or_else(|_| JsonValue::String(val.to_string()))
        } else {
            JsonValue::String(val.to_string())
        };

        set_nested(&mut values, &split_path(key), json_value);
    }

    Ok(values)
}
