//! Data provider pipeline.

use tracing::{debug, instrument};

use crate::errors::IndexerError;
use search_indexer_shared::{Batch, NamedDataProvider};

/// An ordered list of data providers applied to every batch.
pub struct DataProviderPipeline {
    providers: Vec<NamedDataProvider>,
}

impl DataProviderPipeline {
    /// Create a pipeline running `providers` in the given order.
    pub fn new(providers: Vec<NamedDataProvider>) -> Self {
        Self { providers }
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Provider names in execution order.
    pub fn names(&self) -> Vec<&str> {
        self.providers.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Run every provider over the batch.
    ///
    /// Once the batch is empty the remaining providers are skipped. A
    /// provider failure aborts the batch.
    #[instrument(skip(self, batch), fields(batch_size = batch.len(), providers = self.providers.len()))]
    pub async fn run(&self, batch: Batch, store_id: u32) -> Result<Batch, IndexerError> {
        let mut batch = batch;

        for (name, provider) in &self.providers {
            if batch.is_empty() {
                debug!(provider = %name, "Batch is empty, skipping remaining providers");
                break;
            }

            batch = provider
                .add_data(batch, store_id)
                .await
                .map_err(|source| IndexerError::data_provider(name.clone(), source))?;
        }

        Ok(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use search_indexer_shared::{DataProvider, DataProviderError, Record};
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Appends its name to a `trail` field and counts calls.
    struct TrailProvider {
        name: &'static str,
        calls: AtomicUsize,
    }

    impl TrailProvider {
        fn new(name: &'static str) -> Arc<Self> {
            Arc::new(Self {
                name,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl DataProvider for TrailProvider {
        async fn add_data(&self, mut batch: Batch, store_id: u32) -> Result<Batch, DataProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            for record in &mut batch {
                let trail = record
                    .entry("trail")
                    .or_insert_with(|| Value::Array(Vec::new()));
                if let Value::Array(items) = trail {
                    items.push(json!(format!("{}@{}", self.name, store_id)));
                }
            }
            Ok(batch)
        }
    }

    struct DropAll;

    #[async_trait]
    impl DataProvider for DropAll {
        async fn add_data(&self, _batch: Batch, _store_id: u32) -> Result<Batch, DataProviderError> {
            Ok(Vec::new())
        }
    }

    struct Failing;

    #[async_trait]
    impl DataProvider for Failing {
        async fn add_data(&self, _batch: Batch, _store_id: u32) -> Result<Batch, DataProviderError> {
            Err(DataProviderError::new("price table unavailable"))
        }
    }

    fn named(name: &str, provider: Arc<dyn DataProvider>) -> NamedDataProvider {
        (name.to_string(), provider)
    }

    fn batch() -> Batch {
        let mut record = Record::new();
        record.insert("id".to_string(), json!(1));
        vec![record]
    }

    #[tokio::test]
    async fn test_providers_run_in_order() {
        let first = TrailProvider::new("first");
        let second = TrailProvider::new("second");
        let pipeline = DataProviderPipeline::new(vec![
            named("first", first.clone()),
            named("second", second.clone()),
        ]);

        let result = pipeline.run(batch(), 3).await.unwrap();

        assert_eq!(result[0]["trail"], json!(["first@3", "second@3"]));
        assert_eq!(pipeline.names(), vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_empty_batch_skips_providers() {
        let provider = TrailProvider::new("only");
        let pipeline = DataProviderPipeline::new(vec![named("only", provider.clone())]);

        let result = pipeline.run(Vec::new(), 1).await.unwrap();

        assert!(result.is_empty());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_providers_after_emptying_are_skipped() {
        let after = TrailProvider::new("after");
        let pipeline = DataProviderPipeline::new(vec![
            named("drop", Arc::new(DropAll)),
            named("after", after.clone()),
        ]);

        let result = pipeline.run(batch(), 1).await.unwrap();

        assert!(result.is_empty());
        assert_eq!(after.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_provider_failure_names_provider() {
        let pipeline = DataProviderPipeline::new(vec![named("prices", Arc::new(Failing))]);

        let err = pipeline.run(batch(), 1).await.unwrap_err();

        match err {
            IndexerError::DataProviderError { provider, .. } => assert_eq!(provider, "prices"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
