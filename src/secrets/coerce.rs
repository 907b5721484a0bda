//! Conversion of JSON values into the bytes handed to the control plane.

use serde_json::{Number, Value};

/// Canonical byte form of a JSON value.
///
/// Strings are taken verbatim (unquoted, never re-parsed), booleans and null
/// become their literal text, numbers their shortest decimal text, and
/// objects or arrays their JSON serialization. Every value has a byte form.
pub fn coerce(value: &Value) -> Vec<u8> {
    match value {
        Value::String(s) => s.as_bytes().to_vec(),
        Value::Bool(b) => b.to_string().into_bytes(),
        Value::Number(n) => format_number(n).into_bytes(),
        Value::Null => b"null".to_vec(),
        composite @ (Value::Object(_) | Value::Array(_)) => composite.to_string().into_bytes(),
    }
}

/// Integers print as integers. Floats print through `f64`'s `Display`, which
/// is the shortest text that round-trips and never uses an exponent, so
/// `1.0` becomes `1` and `1e21` becomes `1000000000000000000000`.
fn format_number(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        i.to_string()
    } else if let Some(u) = n.as_u64() {
        u.to_string()
    } else {
        n.as_f64().map_or_else(|| n.to_string(), |f| f.to_string())
    }
}
