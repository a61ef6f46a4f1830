//! Lenient per-key extraction from a JSON options object.
//!
//! Host pages pass loosely typed option bags. Each helper returns the
//! default when the key is missing or holds the wrong JSON type, so one bad
//! key never discards the rest of the options.

use serde_json::Value;

/// `params[name]` as `f64`; integers are accepted.
pub fn param_f64(params: &Value, name: &str, default: f64) -> f64 {
    params.get(name).and_then(Value::as_f64).unwrap_or(default)
}

/// `params[name]` as a non-negative integer.
pub fn param_usize(params: &Value, name: &str, default: usize) -> usize {
    params
        .get(name)
        .and_then(Value::as_u64)
        .and_then(|v| usize::try_from(v).ok())
        .unwrap_or(default)
}

/// `params[name]` as an `i32`, falling back when it does not fit.
pub fn param_i32(params: &Value, name: &str, default: i32) -> i32 {
    params
        .get(name)
        .and_then(Value::as_i64)
        .and_then(|v| i32::try_from(v).ok())
        .unwrap_or(default)
}

/// `params[name]` as a string slice, if present and a string.
pub fn param_str<'a>(params: &'a Value, name: &str) -> Option<&'a str> {
    params.get(name).and_then(Value::as_str)
}
