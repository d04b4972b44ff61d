//! Data provider contract.

use async_trait::async_trait;
use thiserror::Error;

use crate::record::Batch;

/// Failure reported by a data provider.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct DataProviderError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl DataProviderError {
    /// Create an error from a message.
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            source: None,
        }
    }

    /// Create an error wrapping an underlying cause.
    pub fn with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }
}

/// A named enrichment stage applied to every batch of a type.
///
/// Providers receive the batch by value and return it with fields added or
/// modified. The returned batch is normally the same size; a provider may
/// drop records it cannot serve.
#[async_trait]
pub trait DataProvider: Send + Sync {
    /// Enrich a batch of records for the given store.
    async fn add_data(&self, batch: Batch, store_id: u32) -> Result<Batch, DataProviderError>;
}
