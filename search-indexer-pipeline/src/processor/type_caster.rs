//! Field value casting against a type mapping.
//!
//! Records usually come from sources that do not preserve types (numbers
//! and flags stored as strings). Before transmission every mapped field is
//! coerced to its declared type so the backend does not reject the document
//! or index it under the wrong type.

use serde_json::{Number, Value};

use crate::errors::TypeCastError;
use search_indexer_shared::{Batch, FieldType, IndexType, Record, TypeMapping};

/// Casts record fields to the types declared by an index type.
#[derive(Debug, Default, Clone, Copy)]
pub struct TypeCaster;

impl TypeCaster {
    pub fn new() -> Self {
        Self
    }

    /// Cast every record of the batch using the type's mapping.
    ///
    /// Fields absent from the mapping are left untouched.
    pub fn cast_fields_using_mapping(
        &self,
        index_type: &IndexType,
        batch: Batch,
    ) -> Result<Batch, TypeCastError> {
        batch
            .into_iter()
            .map(|record| cast_record(index_type.mapping(), record, ""))
            .collect()
    }
}

fn cast_record(mapping: &TypeMapping, mut record: Record, prefix: &str) -> Result<Record, TypeCastError> {
    for (field, value) in record.iter_mut() {
        let Some(field_type) = mapping.get(field) else {
            continue;
        };

        let path = if prefix.is_empty() {
            field.clone()
        } else {
            format!("{}.{}", prefix, field)
        };
        *value = cast_value(&path, field_type, std::mem::take(value))?;
    }

    Ok(record)
}

fn cast_value(path: &str, field_type: &FieldType, value: Value) -> Result<Value, TypeCastError> {
    match value {
        Value::Null => Ok(Value::Null),
        // Multi-valued fields share the mapping of a single value
        Value::Array(items) => items
            .into_iter()
            .map(|item| cast_value(path, field_type, item))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        value => cast_single(path, field_type, value),
    }
}

fn cast_single(path: &str, field_type: &FieldType, value: Value) -> Result<Value, TypeCastError> {
    if let Some(properties) = field_type.properties() {
        return match value {
            Value::Object(object) => cast_record(properties, object, path).map(Value::Object),
            other => Ok(other),
        };
    }

    let cast = if field_type.is_integral() {
        to_integer(&value)
    } else if field_type.is_floating() {
        to_float(&value)
    } else {
        match field_type {
            FieldType::Boolean => to_boolean(&value),
            FieldType::Keyword | FieldType::Text => Some(to_text(value.clone())),
            _ => Some(value.clone()),
        }
    };

    cast.ok_or_else(|| TypeCastError {
        field: path.to_string(),
        expected: field_type.name(),
        value: value.to_string(),
    })
}

fn to_integer(value: &Value) -> Option<Value> {
    match value {
        Value::Number(n) if n.is_i64() || n.is_u64() => Some(Value::Number(n.clone())),
        Value::Number(n) => n.as_f64().and_then(truncate),
        Value::Bool(b) => Some(Value::from(i64::from(*b))),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return Some(Value::Null);
            }
            match s.parse::<i64>() {
                Ok(i) => Some(Value::from(i)),
                Err(_) => s.parse::<f64>().ok().and_then(truncate),
            }
        }
        _ => None,
    }
}

fn truncate(f: f64) -> Option<Value> {
    let t = f.trunc();
    if t.is_finite() && t >= i64::MIN as f64 && t <= i64::MAX as f64 {
        Some(Value::from(t as i64))
    } else {
        None
    }
}

fn to_float(value: &Value) -> Option<Value> {
    let f = match value {
        Value::Number(n) => n.as_f64()?,
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return Some(Value::Null);
            }
            s.parse::<f64>().ok()?
        }
        _ => return None,
    };

    Number::from_f64(f).map(Value::Number)
}

fn to_boolean(value: &Value) -> Option<Value> {
    match value {
        Value::Bool(b) => Some(Value::Bool(*b)),
        Value::Number(n) => n.as_f64().map(|f| Value::Bool(f != 0.0)),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(Value::Bool(true)),
            "0" | "false" | "no" | "off" | "" => Some(Value::Bool(false)),
            _ => None,
        },
        _ => None,
    }
}

fn to_text(value: Value) -> Value {
    match value {
        Value::Number(n) => Value::String(n.to_string()),
        Value::Bool(b) => Value::String(b.to_string()),
        other => other,
    }
}
