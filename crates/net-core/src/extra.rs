//! Provider extra-metadata handling

use std::collections::HashMap;

use serde_json::Value;

/// A single value from a provider's extra-metadata map.
///
/// Providers return plain JSON data for most keys, but some stuff native
/// objects (timestamps, driver handles) into the map that only carry a
/// printable form.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtraValue {
    Json(Value),
    Opaque(String),
}

impl ExtraValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ExtraValue::Json(Value::String(s)) => Some(s),
            ExtraValue::Opaque(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ExtraValue::Json(Value::Bool(flag)) => Some(*flag),
            _ => None,
        }
    }
}

impl From<Value> for ExtraValue {
    fn from(value: Value) -> Self {
        ExtraValue::Json(value)
    }
}

impl From<&str> for ExtraValue {
    fn from(value: &str) -> Self {
        ExtraValue::Json(Value::String(value.to_string()))
    }
}

/// Coerce an extra-metadata map into a persistable JSON map.
///
/// Values without a JSON representation are stored as their string form;
/// every other key passes through unchanged.
pub fn normalize_extra(extra: &HashMap<String, ExtraValue>) -> HashMap<String, Value> {
    extra
        .iter()
        .map(|(key, value)| {
            let value = match value {
                ExtraValue::Json(json) => json.clone(),
                ExtraValue::Opaque(raw) => Value::String(raw.clone()),
            };
            (key.clone(), value)
        })
        .collect()
}

/// Interpret a provider boolean flag.
///
/// EC2 returns the `is_default` flag both as a native boolean and as the
/// strings `"true"`/`"True"`; match those sentinels explicitly and treat
/// anything else as false.
pub fn parse_bool_flag(value: &ExtraValue) -> bool {
    match value {
        ExtraValue::Json(Value::Bool(flag)) => *flag,
        ExtraValue::Json(Value::String(s)) => s == "true" || s == "True",
        ExtraValue::Opaque(raw) => raw == "true" || raw == "True",
        _ => false,
    }
}

/// Remove `key` from the map and return its string form, if any.
pub fn pop_string(extra: &mut HashMap<String, ExtraValue>, key: &str) -> Option<String> {
    extra
        .remove(key)
        .and_then(|value| value.as_str().map(str::to_string))
}

/// Remove `key` from the map and return it as a boolean, if any.
pub fn pop_bool(extra: &mut HashMap<String, ExtraValue>, key: &str) -> Option<bool> {
    extra.remove(key).and_then(|value| value.as_bool())
}
