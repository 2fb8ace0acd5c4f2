//! Helper functions for reading keyword values
//!
//! Each helper checks the JSON type of one keyword value and extracts it.
//! Errors carry the keyword name; the caller attaches the pointer.

use crate::error::{SchemaError, SchemaResult};
use serde_json::{Map, Value};

/// A string value
pub(crate) fn as_string<'v>(keyword: &str, value: &'v Value) -> SchemaResult<&'v str> {
    value
        .as_str()
        .ok_or_else(|| SchemaError::keyword(keyword, "must be a string"))
}

/// A string value, with `null` meaning unset
pub(crate) fn as_optional_string(keyword: &str, value: &Value) -> SchemaResult<Option<String>> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        _ => Err(SchemaError::keyword(keyword, "must be a string")),
    }
}

/// A number value
pub(crate) fn as_number(keyword: &str, value: &Value) -> SchemaResult<f64> {
    value
        .as_f64()
        .ok_or_else(|| SchemaError::keyword(keyword, "must be a number"))
}

/// An integer value; range checks are left to the node setters
pub(crate) fn as_integer(keyword: &str, value: &Value) -> SchemaResult<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_u64().map(|_| i64::MAX))
            .ok_or_else(|| SchemaError::keyword(keyword, "must be an integer")),
        _ => Err(SchemaError::keyword(keyword, "must be an integer")),
    }
}

/// A boolean value
pub(crate) fn as_bool(keyword: &str, value: &Value) -> SchemaResult<bool> {
    value
        .as_bool()
        .ok_or_else(|| SchemaError::keyword(keyword, "must be a boolean"))
}

/// An object value
pub(crate) fn as_object<'v>(
    keyword: &str,
    value: &'v Value,
) -> SchemaResult<&'v Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| SchemaError::keyword(keyword, "must be an object"))
}

/// A non-empty array value
pub(crate) fn as_non_empty_array<'v>(keyword: &str, value: &'v Value) -> SchemaResult<&'v [Value]> {
    match value {
        Value::Array(items) if !items.is_empty() => Ok(items),
        Value::Array(_) => Err(SchemaError::keyword(keyword, "must not be empty")),
        _ => Err(SchemaError::keyword(keyword, "must be an array")),
    }
}

/// A non-empty array of distinct strings
pub(crate) fn as_unique_strings(keyword: &str, value: &Value) -> SchemaResult<Vec<String>> {
    let items = as_non_empty_array(keyword, value)?;
    let mut strings: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        let s = item
            .as_str()
            .ok_or_else(|| SchemaError::keyword(keyword, "must contain only strings"))?;
        if strings.iter().any(|existing| existing == s) {
            return Err(SchemaError::keyword(keyword, format!("duplicate entry '{}'", s)));
        }
        strings.push(s.to_string());
    }
    Ok(strings)
}
