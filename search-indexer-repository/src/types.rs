//! Request and response types for index operations.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::errors::SearchError;
use crate::opensearch::queries::build_stale_documents_query;
use search_indexer_shared::{Batch, Record, TransactionKey};

/// Kind of write carried by a bulk request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BulkOperationKind {
    /// Full document insert or replace.
    Index,
    /// Partial update of an existing document.
    Update,
}

impl BulkOperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Index => "index",
            Self::Update => "update",
        }
    }
}

/// One write inside a bulk request.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkOperation {
    /// Document id taken from the record's id field.
    pub id: String,
    /// The record to write.
    pub document: Record,
}

/// A bulk write against a single index and type.
///
/// All operations in a request share one kind; the request is built from a
/// whole batch and submitted in one round-trip.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkRequest {
    index: String,
    type_name: String,
    operation: BulkOperationKind,
    operations: Vec<BulkOperation>,
}

impl BulkRequest {
    /// Build a request that inserts or replaces every document in the batch.
    pub fn add_documents(
        index: impl Into<String>,
        type_name: impl Into<String>,
        documents: Batch,
        id_field: &str,
    ) -> Result<Self, SearchError> {
        Self::build(BulkOperationKind::Index, index, type_name, documents, id_field)
    }

    /// Build a request that partially updates every document in the batch.
    pub fn update_documents(
        index: impl Into<String>,
        type_name: impl Into<String>,
        documents: Batch,
        id_field: &str,
    ) -> Result<Self, SearchError> {
        Self::build(BulkOperationKind::Update, index, type_name, documents, id_field)
    }

    fn build(
        operation: BulkOperationKind,
        index: impl Into<String>,
        type_name: impl Into<String>,
        documents: Batch,
        id_field: &str,
    ) -> Result<Self, SearchError> {
        let operations = documents
            .into_iter()
            .map(|document| {
                let id = document_id(&document, id_field)?;
                Ok(BulkOperation { id, document })
            })
            .collect::<Result<Vec<_>, SearchError>>()?;

        Ok(Self {
            index: index.into(),
            type_name: type_name.into(),
            operation,
            operations,
        })
    }

    pub fn index(&self) -> &str {
        &self.index
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn operation(&self) -> BulkOperationKind {
        self.operation
    }

    pub fn operations(&self) -> &[BulkOperation] {
        &self.operations
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Bulk API body lines: one action line followed by one source line per
    /// operation.
    pub fn to_body_lines(&self) -> Vec<Value> {
        let mut lines = Vec::with_capacity(self.operations.len() * 2);
        let action = self.operation.as_str();

        for op in &self.operations {
            let mut meta = Map::new();
            meta.insert(
                action.to_string(),
                json!({ "_index": self.index, "_id": op.id }),
            );
            lines.push(Value::Object(meta));
            match self.operation {
                BulkOperationKind::Index => lines.push(Value::Object(op.document.clone())),
                BulkOperationKind::Update => lines.push(json!({ "doc": op.document })),
            }
        }

        lines
    }
}

fn document_id(document: &Record, id_field: &str) -> Result<String, SearchError> {
    match document.get(id_field) {
        Some(Value::String(id)) if !id.is_empty() => Ok(id.clone()),
        Some(Value::Number(id)) => Ok(id.to_string()),
        Some(other) => Err(SearchError::invalid_document(format!(
            "field '{}' is not a usable document id: {}",
            id_field, other
        ))),
        None => Err(SearchError::invalid_document(format!(
            "document has no '{}' field",
            id_field
        ))),
    }
}

/// Error reported by the backend for a single bulk item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkItemError {
    #[serde(rename = "type")]
    pub error_type: String,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Outcome of one operation in a bulk response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BulkItem {
    /// Action name as reported by the backend (`index`, `update`, ...).
    pub operation: String,
    pub index: String,
    pub document_type: String,
    pub id: Option<String>,
    pub status: u16,
    pub error: Option<BulkItemError>,
}

/// Failures sharing the same operation, index, type and cause.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BulkErrorGroup {
    pub operation: String,
    pub index: String,
    pub document_type: String,
    pub error_type: String,
    pub error_reason: String,
    pub count: usize,
    /// Affected ids in response order.
    pub document_ids: Vec<String>,
}

/// Result of one bulk call.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BulkResponse {
    took: u64,
    errors: bool,
    items: Vec<BulkItem>,
}

#[derive(Deserialize)]
struct RawBulkResponse {
    #[serde(default)]
    took: u64,
    #[serde(default)]
    errors: bool,
    #[serde(default)]
    items: Vec<BTreeMap<String, RawBulkItem>>,
}

#[derive(Deserialize)]
struct RawBulkItem {
    #[serde(rename = "_index", default)]
    index: String,
    #[serde(rename = "_type")]
    document_type: Option<String>,
    #[serde(rename = "_id")]
    id: Option<String>,
    #[serde(default)]
    status: u16,
    error: Option<BulkItemError>,
}

impl BulkResponse {
    pub fn new(took: u64, items: Vec<BulkItem>) -> Self {
        let errors = items.iter().any(|item| item.error.is_some());
        Self {
            took,
            errors,
            items,
        }
    }

    /// Response for a request that was never sent.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse a bulk API response body. Items without a `_type` are
    /// attributed to `document_type`.
    pub fn from_json(body: Value, document_type: &str) -> Result<Self, SearchError> {
        let raw: RawBulkResponse =
            serde_json::from_value(body).map_err(|e| SearchError::parse(e.to_string()))?;

        let items: Vec<BulkItem> = raw
            .items
            .into_iter()
            .flat_map(|entry| entry.into_iter())
            .map(|(operation, item)| BulkItem {
                operation,
                index: item.index,
                document_type: item
                    .document_type
                    .unwrap_or_else(|| document_type.to_string()),
                id: item.id,
                status: item.status,
                error: item.error,
            })
            .collect();

        let mut response = Self::new(raw.took, items);
        response.errors |= raw.errors;
        Ok(response)
    }

    pub fn took(&self) -> u64 {
        self.took
    }

    pub fn items(&self) -> &[BulkItem] {
        &self.items
    }

    pub fn has_errors(&self) -> bool {
        self.errors
    }

    /// Number of items that reported an error.
    pub fn failed_count(&self) -> usize {
        self.items.iter().filter(|i| i.error.is_some()).count()
    }

    /// Group failed items by operation, index, type, error type and reason,
    /// in order of first appearance.
    pub fn aggregate_errors_by_reason(&self) -> Vec<BulkErrorGroup> {
        let mut groups: Vec<BulkErrorGroup> = Vec::new();
        let mut positions: HashMap<(String, String, String, String, String), usize> =
            HashMap::new();

        for item in &self.items {
            let Some(error) = &item.error else {
                continue;
            };
            let reason = error.reason.clone().unwrap_or_default();
            let key = (
                item.operation.clone(),
                item.index.clone(),
                item.document_type.clone(),
                error.error_type.clone(),
                reason.clone(),
            );

            let position = *positions.entry(key).or_insert_with(|| {
                groups.push(BulkErrorGroup {
                    operation: item.operation.clone(),
                    index: item.index.clone(),
                    document_type: item.document_type.clone(),
                    error_type: error.error_type.clone(),
                    error_reason: reason,
                    count: 0,
                    document_ids: Vec::new(),
                });
                groups.len() - 1
            });

            let group = &mut groups[position];
            group.count += 1;
            if let Some(id) = &item.id {
                group.document_ids.push(id.clone());
            }
        }

        groups
    }
}

/// A delete-by-query request against one index and type.
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteByQueryRequest {
    pub index: String,
    pub type_name: String,
    pub body: Value,
}

impl DeleteByQueryRequest {
    /// Delete every document not stamped with `transaction_key`, limited to
    /// `document_ids` when any are given.
    pub fn stale_documents(
        index: impl Into<String>,
        type_name: impl Into<String>,
        transaction_key: &TransactionKey,
        document_ids: &[String],
    ) -> Self {
        Self {
            index: index.into(),
            type_name: type_name.into(),
            body: build_stale_documents_query(transaction_key, document_ids),
        }
    }
}
