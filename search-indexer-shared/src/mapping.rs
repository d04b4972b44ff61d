//! Field mappings declared by an index type.
//!
//! The same description drives value casting before transmission and the
//! `properties` section of the create-index request.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Field name to semantic type.
pub type TypeMapping = BTreeMap<String, FieldType>;

/// Semantic type of a single field.
///
/// Serializes to the backend mapping shape, e.g. `{"type": "integer"}` or
/// `{"type": "nested", "properties": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldType {
    Byte,
    Short,
    Integer,
    Long,
    HalfFloat,
    Float,
    Double,
    ScaledFloat {
        scaling_factor: f64,
    },
    Boolean,
    Keyword,
    Text,
    Date,
    Object {
        #[serde(default)]
        properties: TypeMapping,
    },
    Nested {
        #[serde(default)]
        properties: TypeMapping,
    },
}

impl FieldType {
    /// Whether values are cast to a whole number.
    pub fn is_integral(&self) -> bool {
        matches!(self, Self::Byte | Self::Short | Self::Integer | Self::Long)
    }

    /// Whether values are cast to a floating point number.
    pub fn is_floating(&self) -> bool {
        matches!(
            self,
            Self::HalfFloat | Self::Float | Self::Double | Self::ScaledFloat { .. }
        )
    }

    /// Sub-properties for object-like fields.
    pub fn properties(&self) -> Option<&TypeMapping> {
        match self {
            Self::Object { properties } | Self::Nested { properties } => Some(properties),
            _ => None,
        }
    }

    /// Backend name of the type.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Byte => "byte",
            Self::Short => "short",
            Self::Integer => "integer",
            Self::Long => "long",
            Self::HalfFloat => "half_float",
            Self::Float => "float",
            Self::Double => "double",
            Self::ScaledFloat { .. } => "scaled_float",
            Self::Boolean => "boolean",
            Self::Keyword => "keyword",
            Self::Text => "text",
            Self::Date => "date",
            Self::Object { .. } => "object",
            Self::Nested { .. } => "nested",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_serializes_to_backend_mapping() {
        let mut children = TypeMapping::new();
        children.insert("sku".to_string(), FieldType::Keyword);

        let mut mapping = TypeMapping::new();
        mapping.insert("price".to_string(), FieldType::Double);
        mapping.insert(
            "children".to_string(),
            FieldType::Nested {
                properties: children,
            },
        );

        let value = serde_json::to_value(&mapping).unwrap();

        assert_eq!(
            value,
            json!({
                "children": {
                    "type": "nested",
                    "properties": { "sku": { "type": "keyword" } }
                },
                "price": { "type": "double" }
            })
        );
    }

    #[test]
    fn test_deserializes_from_backend_mapping() {
        let field: FieldType =
            serde_json::from_value(json!({ "type": "scaled_float", "scaling_factor": 100.0 }))
                .unwrap();

        assert_eq!(field, FieldType::ScaledFloat { scaling_factor: 100.0 });
        assert!(field.is_floating());
        assert!(!field.is_integral());
    }
}
