//! Generic indexer handler.
//!
//! Coordinates the pipeline components for one index identifier and type:
//!
//! 1. Resolve (or create) the store's index and look up the type
//! 2. Split the input stream into batches
//! 3. Enrich each batch with the type's data providers
//! 4. Cast field values to the type mapping
//! 5. Submit one bulk request per batch and report per-document failures
//! 6. Refresh the index once all batches are written
//!
//! Stale documents from earlier runs are removed with
//! [`GenericIndexerHandler::clean_up_by_transaction_key`].

mod outcome;

pub use outcome::{CleanupOutcome, IndexOutcome, IndexingSummary};

use std::sync::Arc;

use futures::{pin_mut, Stream, StreamExt};
use tracing::{debug, info, instrument, warn};

use crate::batch::chunk_records;
use crate::errors::IndexerError;
use crate::events::{NoopSaveListener, SaveDocumentsListener, SavedDocumentsEvent};
use crate::loader::log_bulk_errors;
use crate::processor::{DataProviderPipeline, TypeCaster};
use crate::transaction_key::TransactionKeyProvider;
use search_indexer_repository::{BulkOperationKind, BulkRequest, DeleteByQueryRequest, IndexOperation};
use search_indexer_shared::{
    Batch, Index, IndexType, Record, Store, TransactionKey, TRANSACTION_KEY_FIELD,
};

/// Indexes records of one type into the per-store index.
///
/// The transaction key is loaded once at construction and stamped on every
/// document written by [`save_index`](Self::save_index).
pub struct GenericIndexerHandler {
    index_operation: Arc<dyn IndexOperation>,
    type_caster: TypeCaster,
    listener: Arc<dyn SaveDocumentsListener>,
    transaction_key: TransactionKey,
    index_identifier: String,
    type_name: String,
}

impl GenericIndexerHandler {
    /// Create a handler for `type_name` documents in the `index_identifier`
    /// index.
    pub fn new(
        index_operation: Arc<dyn IndexOperation>,
        transaction_key: &dyn TransactionKeyProvider,
        index_identifier: impl Into<String>,
        type_name: impl Into<String>,
    ) -> Self {
        Self {
            index_operation,
            type_caster: TypeCaster::new(),
            listener: Arc::new(NoopSaveListener),
            transaction_key: transaction_key.load(),
            index_identifier: index_identifier.into(),
            type_name: type_name.into(),
        }
    }

    /// Notify `listener` after each saved batch.
    pub fn with_listener(mut self, listener: Arc<dyn SaveDocumentsListener>) -> Self {
        self.listener = listener;
        self
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// The generation marker of this handler.
    pub fn transaction_key(&self) -> &TransactionKey {
        &self.transaction_key
    }

    /// Partially update documents using only the named data providers.
    ///
    /// When none of `required_providers` is registered on the type, nothing
    /// is read from `documents` and the index is not refreshed.
    ///
    /// A disabled or unreachable backend is returned as an error, unlike
    /// [`save_index`](Self::save_index).
    #[instrument(skip(self, documents, store, required_providers), fields(type_name = %self.type_name, store = %store.code))]
    pub async fn update_index<S, N>(
        &self,
        documents: S,
        store: &Store,
        required_providers: &[N],
    ) -> Result<IndexOutcome, IndexerError>
    where
        S: Stream<Item = Record> + Send,
        N: AsRef<str> + Sync,
    {
        let index = self.get_index(store).await?;
        let index_type = self.resolve_type(&index)?;
        let pipeline = DataProviderPipeline::new(index_type.data_providers_named(required_providers));

        if pipeline.is_empty() {
            debug!("No requested data provider is registered for the type, skipping update");
            return Ok(IndexOutcome::Skipped);
        }

        let summary = self
            .write_documents(documents, store, &index, index_type, &pipeline, BulkOperationKind::Update)
            .await?;

        Ok(IndexOutcome::Indexed(summary))
    }

    /// Fully (re)index documents using every data provider of the type.
    ///
    /// A disabled or unreachable backend ends the call early with
    /// [`IndexOutcome::TransportDisabled`]; batches already submitted stay
    /// written and the index is not refreshed.
    #[instrument(skip(self, documents, store), fields(type_name = %self.type_name, store = %store.code))]
    pub async fn save_index<S>(&self, documents: S, store: &Store) -> Result<IndexOutcome, IndexerError>
    where
        S: Stream<Item = Record> + Send,
    {
        match self.try_save_index(documents, store).await {
            Err(e) if e.is_transport_failure() => {
                warn!(error = %e, "Search backend unavailable, skipping save");
                Ok(IndexOutcome::TransportDisabled)
            }
            result => result,
        }
    }

    async fn try_save_index<S>(&self, documents: S, store: &Store) -> Result<IndexOutcome, IndexerError>
    where
        S: Stream<Item = Record> + Send,
    {
        let index = self.get_index(store).await?;
        let index_type = self.resolve_type(&index)?;
        let pipeline = DataProviderPipeline::new(index_type.data_providers().to_vec());

        let summary = self
            .write_documents(documents, store, &index, index_type, &pipeline, BulkOperationKind::Index)
            .await?;

        Ok(IndexOutcome::Indexed(summary))
    }

    /// Delete documents of the store's index that were not written with the
    /// current transaction key, optionally limited to `document_ids`.
    #[instrument(skip(self, store, document_ids), fields(type_name = %self.type_name, store = %store.code))]
    pub async fn clean_up_by_transaction_key(
        &self,
        store: &Store,
        document_ids: Option<&[String]>,
    ) -> Result<CleanupOutcome, IndexerError> {
        match self.try_clean_up(store, document_ids.unwrap_or_default()).await {
            Err(e) if e.is_transport_failure() => {
                warn!(error = %e, "Search backend unavailable, skipping cleanup");
                Ok(CleanupOutcome::TransportDisabled)
            }
            result => result,
        }
    }

    async fn try_clean_up(
        &self,
        store: &Store,
        document_ids: &[String],
    ) -> Result<CleanupOutcome, IndexerError> {
        let index_name = self.index_operation.index_name(&self.index_identifier, store);

        let exists = self
            .index_operation
            .index_exists(&index_name)
            .await
            .map_err(|e| IndexerError::operation("index_exists", &index_name, &self.type_name, e))?;
        if !exists {
            debug!(index = %index_name, "Index does not exist, nothing to clean up");
            return Ok(CleanupOutcome::IndexMissing);
        }

        let index = self
            .index_operation
            .get_index_by_name(&self.index_identifier, store)
            .await
            .map_err(|e| IndexerError::operation("get_index", &index_name, &self.type_name, e))?;

        let request = DeleteByQueryRequest::stale_documents(
            index.name(),
            &self.type_name,
            &self.transaction_key,
            document_ids,
        );

        let deleted = self
            .index_operation
            .delete_by_query(request)
            .await
            .map_err(|e| IndexerError::operation("delete_by_query", index.name(), &self.type_name, e))?;

        info!(
            index = %index.name(),
            transaction_key = %self.transaction_key,
            deleted = deleted,
            "Cleaned up documents from previous runs"
        );

        Ok(CleanupOutcome::Deleted { deleted })
    }

    /// Resolve the store's index, creating it when it cannot be resolved.
    async fn get_index(&self, store: &Store) -> Result<Index, IndexerError> {
        match self
            .index_operation
            .get_index_by_name(&self.index_identifier, store)
            .await
        {
            Ok(index) => Ok(index),
            Err(e) => {
                debug!(error = %e, "Index not resolved, creating it");
                self.index_operation
                    .create_index(&self.index_identifier, store)
                    .await
                    .map_err(|e| {
                        IndexerError::operation(
                            "create_index",
                            self.index_operation.index_name(&self.index_identifier, store),
                            &self.type_name,
                            e,
                        )
                    })
            }
        }
    }

    fn resolve_type<'a>(&self, index: &'a Index) -> Result<&'a IndexType, IndexerError> {
        index
            .get_type(&self.type_name)
            .ok_or_else(|| IndexerError::UnknownType {
                index: index.name().to_string(),
                type_name: self.type_name.clone(),
            })
    }

    async fn write_documents<S>(
        &self,
        documents: S,
        store: &Store,
        index: &Index,
        index_type: &IndexType,
        pipeline: &DataProviderPipeline,
        operation: BulkOperationKind,
    ) -> Result<IndexingSummary, IndexerError>
    where
        S: Stream<Item = Record> + Send,
    {
        debug!(providers = ?pipeline.names(), operation = operation.as_str(), "Writing documents");

        let batches = chunk_records(documents, self.index_operation.batch_indexing_size())?;
        pin_mut!(batches);

        let mut summary = IndexingSummary::default();

        while let Some(batch) = batches.next().await {
            let docs = pipeline.run(batch, store.id).await?;
            let docs = self.type_caster.cast_fields_using_mapping(index_type, docs)?;

            if docs.is_empty() {
                debug!("Batch is empty after enrichment, nothing to send");
                summary.skipped_empty_batches += 1;
                continue;
            }

            let request = self
                .build_bulk(operation, index, index_type, docs)
                .map_err(|e| IndexerError::operation("build_bulk", index.name(), &self.type_name, e))?;
            let count = request.len();

            let response = self
                .index_operation
                .execute_bulk(request)
                .await
                .map_err(|e| IndexerError::operation("execute_bulk", index.name(), &self.type_name, e))?;

            log_bulk_errors(&response);
            summary.record_batch(count, response.failed_count());

            if operation == BulkOperationKind::Index {
                self.listener.documents_saved(&SavedDocumentsEvent {
                    data_type: &self.type_name,
                    bulk_response: &response,
                });
            }
        }

        self.index_operation
            .refresh_index(index)
            .await
            .map_err(|e| IndexerError::operation("refresh_index", index.name(), &self.type_name, e))?;

        info!(
            index = %index.name(),
            identifier = %index.identifier(),
            operation = operation.as_str(),
            batches = summary.batches,
            documents = summary.documents,
            failed = summary.failed_documents,
            "Indexing completed"
        );

        Ok(summary)
    }

    fn build_bulk(
        &self,
        operation: BulkOperationKind,
        index: &Index,
        index_type: &IndexType,
        mut docs: Batch,
    ) -> Result<BulkRequest, search_indexer_repository::SearchError> {
        match operation {
            BulkOperationKind::Index => {
                let key = self.transaction_key.to_value();
                for doc in &mut docs {
                    doc.insert(TRANSACTION_KEY_FIELD.to_string(), key.clone());
                }
                BulkRequest::add_documents(index.name(), &self.type_name, docs, index_type.id_field())
            }
            BulkOperationKind::Update => {
                BulkRequest::update_documents(index.name(), &self.type_name, docs, index_type.id_field())
            }
        }
    }
}
