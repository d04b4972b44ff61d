//! Record, batch and store context.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Reserved field stamped on every document written by a full save.
pub const TRANSACTION_KEY_FIELD: &str = "tsk";

/// Field used as the document id when a type does not declare its own.
pub const DEFAULT_ID_FIELD: &str = "id";

/// One domain entity to index, as a field name to value mapping.
pub type Record = Map<String, Value>;

/// An ordered group of records processed and submitted together.
pub type Batch = Vec<Record>;

/// The store (tenant) a document set belongs to.
///
/// Each store gets its own index; data providers receive the store id so
/// they can load store-scoped values.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Store {
    /// Numeric store id passed to data providers.
    pub id: u32,
    /// Store code used to build the backend index name.
    pub code: String,
}

impl Store {
    /// Create a new store context.
    pub fn new(id: u32, code: impl Into<String>) -> Self {
        Self {
            id,
            code: code.into(),
        }
    }
}
