//! Projection of a secret's JSON document onto the values a caller asked for.

use serde_json::{Map, Value};
use std::collections::BTreeMap;

use super::coerce::coerce;
use super::transport::SecretDocument;
use crate::errors::{Error, Result};

fn payload<'a>(key: &str, document: &'a SecretDocument) -> Result<&'a Map<String, Value>> {
    document.data.as_ref().ok_or_else(|| Error::data_missing(key))
}

/// Absent and explicit-null fields are treated alike.
fn field<'a>(key: &str, data: &'a Map<String, Value>, property: &str) -> Result<&'a Value> {
    match data.get(property) {
        Some(Value::Null) | None => Err(Error::property_not_found(key, property)),
        Some(value) => Ok(value),
    }
}

fn coerce_fields(fields: &Map<String, Value>) -> BTreeMap<String, Vec<u8>> {
    fields
        .iter()
        .map(|(name, value)| (name.clone(), coerce(value)))
        .collect()
}

/// Resolve a single value.
///
/// Without a selector the whole document is returned as JSON; with one, the
/// selected field's coerced bytes.
pub fn resolve_value(
    key: &str,
    document: &SecretDocument,
    selector: Option<&str>,
) -> Result<Vec<u8>> {
    let data = payload(key, document)?;

    match selector {
        None => Ok(serde_json::to_vec(data)?),
        Some(property) => field(key, data, property).map(coerce),
    }
}

/// Resolve a key/value map.
///
/// - no selector: every top-level field, coerced
/// - selector naming an object: that object's fields, coerced. Flattening
///   stops there; anything nested deeper comes back as JSON text.
/// - selector naming anything else: one entry keyed by the selector
pub fn resolve_map(
    key: &str,
    document: &SecretDocument,
    selector: Option<&str>,
) -> Result<BTreeMap<String, Vec<u8>>> {
    let data = payload(key, document)?;

    let Some(property) = selector else {
        return Ok(coerce_fields(data));
    };

    match field(key, data, property)? {
        Value::Object(nested) => Ok(coerce_fields(nested)),
        value => Ok(BTreeMap::from([(property.to_string(), coerce(value))])),
    }
}
