//! Dependency initialization and wiring for the search indexer.

use std::sync::Arc;
use tracing::{info, warn};

use crate::config::load_search_config;
use crate::IndexingError;
use search_indexer_pipeline::{
    GenericIndexerHandler, NoopSaveListener, SaveDocumentsListener, TimestampTransactionKey,
    TransactionKeyProvider,
};
use search_indexer_repository::{IndexOperation, OpenSearchIndexOperation, SearchIndexConfig};
use search_indexer_shared::{IndexType, TransactionKey};

/// Container for all initialized dependencies.
///
/// Every handler built from one `Dependencies` shares the same backend and
/// the same transaction key, so a run's saves and its cleanup agree on which
/// documents are current.
pub struct Dependencies {
    index_operation: Arc<dyn IndexOperation>,
    transaction_key: Arc<dyn TransactionKeyProvider>,
    listener: Arc<dyn SaveDocumentsListener>,
}

impl Dependencies {
    /// Initialize all dependencies from environment variables.
    ///
    /// See [`load_search_config`] for the variables read.
    ///
    /// # Arguments
    ///
    /// * `types` - The document types every index is created with
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(IndexingError)` - If the configuration is invalid or the client cannot be built
    pub fn new(types: Vec<IndexType>) -> Result<Self, IndexingError> {
        let config = load_search_config()?;
        Self::from_config(config, types)
    }

    /// Initialize all dependencies from an explicit configuration.
    pub fn from_config(config: SearchIndexConfig, types: Vec<IndexType>) -> Result<Self, IndexingError> {
        if !config.enabled {
            warn!("Search indexing is disabled, backend calls will be skipped");
        }

        let index_operation = OpenSearchIndexOperation::new(config, types)
            .map_err(|e| IndexingError::config(format!("Failed to create OpenSearch client: {}", e)))?;

        info!("Search indexer dependencies initialized");

        Ok(Self::with_index_operation(Arc::new(index_operation)))
    }

    /// Wire an already built backend, e.g. a test double.
    pub fn with_index_operation(index_operation: Arc<dyn IndexOperation>) -> Self {
        Self {
            index_operation,
            transaction_key: Arc::new(TimestampTransactionKey::new()),
            listener: Arc::new(NoopSaveListener),
        }
    }

    /// Use `transaction_key` instead of the timestamp key, e.g. to clean up
    /// after a run executed elsewhere.
    pub fn with_transaction_key(mut self, transaction_key: Arc<dyn TransactionKeyProvider>) -> Self {
        self.transaction_key = transaction_key;
        self
    }

    /// Notify `listener` of every batch saved by handlers built afterwards.
    pub fn with_listener(mut self, listener: Arc<dyn SaveDocumentsListener>) -> Self {
        self.listener = listener;
        self
    }

    pub fn index_operation(&self) -> Arc<dyn IndexOperation> {
        self.index_operation.clone()
    }

    pub fn transaction_key(&self) -> TransactionKey {
        self.transaction_key.load()
    }

    /// Build a handler for `type_name` documents in the `index_identifier`
    /// index.
    pub fn handler(
        &self,
        index_identifier: impl Into<String>,
        type_name: impl Into<String>,
    ) -> GenericIndexerHandler {
        GenericIndexerHandler::new(
            self.index_operation.clone(),
            self.transaction_key.as_ref(),
            index_identifier,
            type_name,
        )
        .with_listener(self.listener.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;
    use search_indexer_pipeline::{
        BroadcastSaveListener, CleanupOutcome, FixedTransactionKey, IndexOutcome,
    };
    use search_indexer_shared::{FieldType, Record, Store};
    use serde_json::json;

    fn types() -> Vec<IndexType> {
        vec![IndexType::new("product").with_field("price", FieldType::Double)]
    }

    fn disabled() -> Dependencies {
        Dependencies::from_config(SearchIndexConfig::disabled(), types()).unwrap()
    }

    #[test]
    fn test_handlers_share_transaction_key() {
        let dependencies = disabled();

        let products = dependencies.handler("catalog", "product");
        let categories = dependencies.handler("catalog", "category");

        assert_eq!(products.transaction_key(), categories.transaction_key());
        assert_eq!(products.transaction_key(), &dependencies.transaction_key());
        assert_eq!(categories.type_name(), "category");
    }

    #[test]
    fn test_fixed_transaction_key() {
        let dependencies = disabled().with_transaction_key(Arc::new(FixedTransactionKey::new("42")));

        assert_eq!(dependencies.handler("catalog", "product").transaction_key().as_str(), "42");
    }

    #[test]
    fn test_invalid_url_is_a_config_error() {
        let result = Dependencies::from_config(SearchIndexConfig::new("::"), types());

        assert!(matches!(result, Err(IndexingError::ConfigError(_))));
    }

    #[tokio::test]
    async fn test_disabled_backend_is_absorbed_by_handlers() {
        let (listener, _receiver) = BroadcastSaveListener::new(8);
        let dependencies = disabled().with_listener(Arc::new(listener));
        let handler = dependencies.handler("catalog", "product");
        let store = Store::new(1, "default");

        let mut record = Record::new();
        record.insert("id".to_string(), json!(1));

        let saved = handler.save_index(stream::iter(vec![record]), &store).await.unwrap();
        let cleaned = handler.clean_up_by_transaction_key(&store, None).await.unwrap();

        assert_eq!(saved, IndexOutcome::TransportDisabled);
        assert_eq!(cleaned, CleanupOutcome::TransportDisabled);
    }
}
