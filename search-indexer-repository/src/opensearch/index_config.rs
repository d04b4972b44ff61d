//! OpenSearch index settings and mappings.
//!
//! The create-index body is derived from the types registered for an index:
//! every type contributes its field mapping, and the reserved transaction
//! key field is always mapped as a keyword so term queries on it are exact.

use serde_json::{json, Map, Value};
use tracing::warn;

use crate::config::SearchIndexConfig;
use search_indexer_shared::{IndexType, TRANSACTION_KEY_FIELD};

/// Build the settings and mappings body for a new index.
///
/// Fields declared by more than one type keep the first declaration.
pub fn build_index_body(types: &[IndexType], config: &SearchIndexConfig) -> Value {
    let mut properties = Map::new();
    properties.insert(
        TRANSACTION_KEY_FIELD.to_string(),
        json!({ "type": "keyword" }),
    );

    for index_type in types {
        for (field, field_type) in index_type.mapping() {
            if properties.contains_key(field) {
                if field != TRANSACTION_KEY_FIELD {
                    warn!(
                        field = %field,
                        type_name = %index_type.name(),
                        "Field already mapped by another type, keeping first mapping"
                    );
                }
                continue;
            }
            properties.insert(field.clone(), json!(field_type));
        }
    }

    json!({
        "settings": {
            "number_of_shards": config.number_of_shards,
            "number_of_replicas": config.number_of_replicas
        },
        "mappings": {
            "properties": properties
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use search_indexer_shared::FieldType;

    #[test]
    fn test_index_body_structure() {
        let types = vec![
            IndexType::new("product")
                .with_field("price", FieldType::Double)
                .with_field("name", FieldType::Text),
            IndexType::new("category")
                .with_field("position", FieldType::Integer)
                .with_field("name", FieldType::Keyword),
        ];
        let config = SearchIndexConfig::default().with_shards(3, 1);

        let body = build_index_body(&types, &config);

        assert_eq!(body["settings"]["number_of_shards"], 3);
        assert_eq!(body["settings"]["number_of_replicas"], 1);

        let properties = &body["mappings"]["properties"];
        assert_eq!(properties["tsk"]["type"], "keyword");
        assert_eq!(properties["price"]["type"], "double");
        assert_eq!(properties["position"]["type"], "integer");
        // First declaration wins
        assert_eq!(properties["name"]["type"], "text");
    }
}
