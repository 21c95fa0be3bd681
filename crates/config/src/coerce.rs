//! Scalar coercion for loosely typed config values
//!
//! Older releases and hand-edited files write booleans and integers either as
//! native TOML scalars or as strings (`"yes"`, `"24"`). Both the validator and
//! the typed decoder go through the functions here so they agree on what is
//! accepted.

use serde::{Deserialize, Deserializer};
use toml::Value;

/// Returns the canonical boolean for a native bool or a recognised string form
///
/// Accepted strings (case-insensitive): `true`, `false`, `1`, `0`, `yes`, `no`.
pub fn coerce_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Boolean(b) => Some(*b),
        Value::String(s) => bool_from_str(s),
        _ => None,
    }
}

/// Returns the integer for a native integer, an integral float, or a numeric string
pub fn coerce_int(value: &Value) -> Option<i64> {
    match value {
        Value::Integer(i) => Some(*i),
        Value::Float(f) => int_from_float(*f),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// Human-readable name of a value's type, used in validation messages
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::String(_) => "string",
        Value::Integer(_) => "integer",
        Value::Float(_) => "float",
        Value::Boolean(_) => "boolean",
        Value::Datetime(_) => "datetime",
        Value::Array(_) => "array",
        Value::Table(_) => "table",
    }
}

/// Describes a value for error messages: strings are quoted, everything else is its type
pub fn describe(value: &Value) -> String {
    match value {
        Value::String(s) => format!("string '{}'", s),
        other => type_name(other).to_string(),
    }
}

fn bool_from_str(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

fn int_from_float(f: f64) -> Option<i64> {
    if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LooseBool {
    Native(bool),
    Text(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LooseInt {
    Native(i64),
    Float(f64),
    Text(String),
}

/// `deserialize_with` adapter accepting any representation `coerce_bool` accepts
pub fn deserialize_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match LooseBool::deserialize(deserializer)? {
        LooseBool::Native(b) => Ok(b),
        LooseBool::Text(s) => bool_from_str(&s).ok_or_else(|| {
            serde::de::Error::custom(format!("expected a boolean, got string '{}'", s))
        }),
    }
}

/// `deserialize_with` adapter for unsigned 32-bit fields accepting loose integers
pub fn deserialize_u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = match LooseInt::deserialize(deserializer)? {
        LooseInt::Native(i) => Some(i),
        LooseInt::Float(f) => int_from_float(f),
        LooseInt::Text(s) => s.trim().parse::<i64>().ok(),
    };

    raw.and_then(|i| u32::try_from(i).ok())
        .ok_or_else(|| serde::de::Error::custom("expected a non-negative integer"))
}
