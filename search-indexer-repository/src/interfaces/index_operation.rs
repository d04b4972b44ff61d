//! Index operation trait definition.
//!
//! This module defines the abstract interface the indexing pipeline uses to
//! talk to the search backend, allowing for different backend
//! implementations (OpenSearch, mock, etc.).

use async_trait::async_trait;

use crate::errors::SearchError;
use crate::types::{BulkRequest, BulkResponse, DeleteByQueryRequest};
use search_indexer_shared::{Index, Store};

/// Abstract interface for index level operations.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync` so a single instance can be
/// shared between handlers.
///
/// # Error Handling
///
/// A disabled or unreachable backend is reported as
/// `SearchError::ConnectionDisabled` / `SearchError::ConnectionError`
/// (see [`SearchError::is_transport_failure`]). Per-document failures inside
/// a bulk call are not errors; they are carried by the returned
/// [`BulkResponse`].
#[async_trait]
pub trait IndexOperation: Send + Sync {
    /// Number of records to send per bulk request.
    fn batch_indexing_size(&self) -> usize;

    /// Backend index name for an identifier and store.
    fn index_name(&self, identifier: &str, store: &Store) -> String;

    /// Check whether an index exists on the backend.
    async fn index_exists(&self, index_name: &str) -> Result<bool, SearchError>;

    /// Resolve an existing index.
    ///
    /// # Returns
    ///
    /// * `Ok(Index)` - The index with its configured types
    /// * `Err(SearchError::IndexNotFound)` - If no such index exists
    /// * `Err(SearchError)` - If the lookup fails
    async fn get_index_by_name(&self, identifier: &str, store: &Store)
        -> Result<Index, SearchError>;

    /// Create the index for an identifier and store, with mappings for all
    /// configured types.
    async fn create_index(&self, identifier: &str, store: &Store) -> Result<Index, SearchError>;

    /// Submit a bulk request.
    ///
    /// # Returns
    ///
    /// * `Ok(BulkResponse)` - Per-item outcomes, possibly containing errors
    /// * `Err(SearchError)` - If the request as a whole failed
    async fn execute_bulk(&self, request: BulkRequest) -> Result<BulkResponse, SearchError>;

    /// Make prior writes to the index visible to search.
    async fn refresh_index(&self, index: &Index) -> Result<(), SearchError>;

    /// Run a delete-by-query, returning the number of deleted documents.
    async fn delete_by_query(&self, request: DeleteByQueryRequest) -> Result<u64, SearchError>;
}
