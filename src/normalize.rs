//! Flatten raw API records.
//!
//! The API nests `indicator` and `country` as `{"id": .., "value": ..}` objects.
//! Tabular loading wants scalars, so each is replaced by its display `value`.

use crate::error::TableError;
use crate::models::Record;
use log::warn;
use serde_json::Value;

/// Nested fields replaced by their display value.
pub const NESTED_FIELDS: [&str; 2] = ["indicator", "country"];

/// What to do with a record that is not an object or lacks a nested field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MalformedPolicy {
    /// Drop the record and keep going.
    #[default]
    Skip,
    /// Abort with `TableError::FieldMissing` or `TableError::NotAnObject`.
    Fail,
}

/// Flatten one record in place.
///
/// A field that is already a string is left alone, so flattening twice is a no-op.
pub fn flatten_record(record: &mut Record, index: usize) -> Result<(), TableError> {
    for field in NESTED_FIELDS {
        let scalar = match record.get(field) {
            Some(Value::String(_)) => continue,
            Some(Value::Object(nested)) => match nested.get("value") {
                Some(v @ Value::String(_)) => v.clone(),
                _ => return Err(TableError::FieldMissing { index, field }),
            },
            _ => return Err(TableError::FieldMissing { index, field }),
        };
        record.insert(field.to_string(), scalar);
    }
    Ok(())
}

/// Flatten a whole response.
pub fn normalize(records: Vec<Value>, policy: MalformedPolicy) -> Result<Vec<Record>, TableError> {
    let mut out = Vec::with_capacity(records.len());
    let mut skipped = 0usize;
    for (index, raw) in records.into_iter().enumerate() {
        let result = match raw {
            Value::Object(mut record) => flatten_record(&mut record, index).map(|_| record),
            other => Err(TableError::NotAnObject {
                index,
                found: json_kind(&other),
            }),
        };
        match (result, policy) {
            (Ok(record), _) => out.push(record),
            (Err(e), MalformedPolicy::Fail) => return Err(e),
            (Err(e), MalformedPolicy::Skip) => {
                warn!("skipping malformed record: {}", e);
                skipped += 1;
            }
        }
    }
    if skipped > 0 {
        warn!("skipped {} malformed record(s), kept {}", skipped, out.len());
    }
    Ok(out)
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
