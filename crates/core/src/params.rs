//! Pure helper functions for extracting typed settings from a `serde_json::Value` object.
//!
//! Each helper takes a JSON value, a key name, and a default. If the key is
//! missing or the value is not the expected type, the default is returned.
//! These never fail; range checks happen later in
//! [`SolverConfig::validate`](crate::config::SolverConfig::validate).

use serde_json::Value;

/// Extracts an `f64` from `params[name]`, returning `default` if missing or wrong type.
///
/// Accepts both JSON numbers (including integers) and converts them to f64.
pub fn param_f64(params: &Value, name: &str, default: f64) -> f64 {
    params.get(name).and_then(Value::as_f64).unwrap_or(default)
}

/// Extracts a `usize` from `params[name]`, returning `default` if missing or wrong type.
///
/// Only succeeds if the JSON value is a non-negative integer.
pub fn param_usize(params: &Value, name: &str, default: usize) -> usize {
    params
        .get(name)
        .and_then(Value::as_u64)
        .and_then(|v| usize::try_from(v).ok())
        .unwrap_or(default)
}

/// Extracts a fixed-length array of numbers from `params[name]`.
///
/// Falls back to `default` unless the value is an array of exactly `N`
/// numbers; a partially valid array is ignored as a whole.
pub fn param_f64_array<const N: usize>(params: &Value, name: &str, default: [f64; N]) -> [f64; N] {
    let Some(items) = params.get(name).and_then(Value::as_array) else {
        return default;
    };
    if items.len() != N {
        return default;
    }
    let mut out = default;
    for (slot, item) in out.iter_mut().zip(items) {
        match item.as_f64() {
            Some(v) => *slot = v,
            None => return default,
        }
    }
    out
}
