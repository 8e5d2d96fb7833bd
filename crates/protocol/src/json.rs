//! Lenient readers over untyped JSON.
//!
//! The evaluation engine emits loosely-shaped records, so fields are read with
//! coercion instead of strict deserialization. Nothing in here fails.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Truthiness of a JSON value: null, `false`, zero, `""`, `[]` and `{}` are falsy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Number or numeric string as `f64`.
pub fn as_f64_lenient(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        Value::Bool(flag) => Some(if *flag { 1.0 } else { 0.0 }),
        _ => None,
    }
}

/// Strings verbatim, null as empty, everything else as compact JSON.
pub fn as_display_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// List stays a list, a truthy scalar becomes a singleton, anything else is empty.
pub fn coerce_list(value: Option<&Value>) -> Vec<Value> {
    match value {
        Some(Value::Array(items)) => items.clone(),
        Some(other) if is_truthy(other) => vec![other.clone()],
        _ => Vec::new(),
    }
}

/// [`coerce_list`] with every element rendered as a string; blank elements are dropped.
pub fn string_list(value: Option<&Value>) -> Vec<String> {
    coerce_list(value)
        .iter()
        .map(as_display_string)
        .filter(|s| !s.trim().is_empty())
        .collect()
}

/// [`coerce_list`] with every element rendered as a string, blanks included.
pub fn item_list(value: Option<&Value>) -> Vec<String> {
    coerce_list(value).iter().map(as_display_string).collect()
}

pub fn round_to(value: f64, places: i32) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

pub(crate) fn de_string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(string_list(value.as_ref()))
}

pub(crate) fn de_item_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(item_list(value.as_ref()))
}

pub(crate) fn de_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(as_f64_lenient).unwrap_or(0.0))
}

pub(crate) fn de_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map(as_display_string).unwrap_or_default())
}

pub(crate) fn de_truthy<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().is_some_and(is_truthy))
}
