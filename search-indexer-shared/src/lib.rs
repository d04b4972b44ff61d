//! # Search Indexer Shared
//!
//! Types shared between the repository and pipeline crates: the record and
//! batch model, store context, type mappings, the data provider contract and
//! the logical index/type description.

mod index;
mod mapping;
mod provider;
mod record;
mod transaction_key;

pub use index::{Index, IndexType, NamedDataProvider};
pub use mapping::{FieldType, TypeMapping};
pub use provider::{DataProvider, DataProviderError};
pub use record::{Batch, Record, Store, DEFAULT_ID_FIELD, TRANSACTION_KEY_FIELD};
pub use transaction_key::TransactionKey;
