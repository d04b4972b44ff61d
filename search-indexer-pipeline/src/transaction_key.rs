//! Transaction key providers.

use std::sync::OnceLock;

use chrono::Utc;
use tracing::debug;

use search_indexer_shared::TransactionKey;

/// Supplies the generation marker for an indexing run.
///
/// `load` must return the same key on every call for the lifetime of the
/// provider.
pub trait TransactionKeyProvider: Send + Sync {
    fn load(&self) -> TransactionKey;
}

/// Key derived from the time of first load.
#[derive(Debug, Default)]
pub struct TimestampTransactionKey {
    key: OnceLock<TransactionKey>,
}

impl TimestampTransactionKey {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TransactionKeyProvider for TimestampTransactionKey {
    fn load(&self) -> TransactionKey {
        self.key
            .get_or_init(|| {
                let key = TransactionKey::from_timestamp(Utc::now());
                debug!(transaction_key = %key, "Generated transaction key");
                key
            })
            .clone()
    }
}

/// A key chosen by the caller, e.g. to clean up after a run executed by
/// another process.
#[derive(Debug, Clone)]
pub struct FixedTransactionKey(TransactionKey);

impl FixedTransactionKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(TransactionKey::new(key))
    }
}

impl TransactionKeyProvider for FixedTransactionKey {
    fn load(&self) -> TransactionKey {
        self.0.clone()
    }
}
