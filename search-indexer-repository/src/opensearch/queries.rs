//! OpenSearch query builders.

use serde_json::{json, Value};

use search_indexer_shared::{TransactionKey, TRANSACTION_KEY_FIELD};

/// Build the delete-by-query body that selects stale documents.
///
/// A document is stale when its `tsk` field differs from the current
/// transaction key. A non-empty `document_ids` list restricts the match to
/// those ids.
pub fn build_stale_documents_query(
    transaction_key: &TransactionKey,
    document_ids: &[String],
) -> Value {
    let mut bool_query = json!({
        "must_not": {
            "term": { TRANSACTION_KEY_FIELD: transaction_key.as_str() }
        }
    });

    if !document_ids.is_empty() {
        bool_query["must"] = json!({
            "terms": { "_id": document_ids }
        });
    }

    json!({ "query": { "bool": bool_query } })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stale_query_without_ids() {
        let query = build_stale_documents_query(&TransactionKey::new("42"), &[]);

        assert_eq!(
            query,
            json!({
                "query": {
                    "bool": {
                        "must_not": { "term": { "tsk": "42" } }
                    }
                }
            })
        );
    }

    #[test]
    fn test_stale_query_restricted_to_ids() {
        let ids = vec!["1".to_string(), "5".to_string()];
        let query = build_stale_documents_query(&TransactionKey::new("42"), &ids);

        assert_eq!(query["query"]["bool"]["must_not"]["term"]["tsk"], "42");
        assert_eq!(query["query"]["bool"]["must"]["terms"]["_id"], json!(["1", "5"]));
    }
}
