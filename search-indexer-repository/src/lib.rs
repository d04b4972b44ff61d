//! # Search Indexer Repository
//!
//! This crate provides the index operation interface used by the indexing
//! pipeline: bulk writes, index resolution and creation, refresh and
//! delete-by-query. It includes the request/response types for those calls
//! and a concrete implementation for OpenSearch.

pub mod config;
pub mod errors;
pub mod interfaces;
pub mod opensearch;
pub mod types;

pub use config::SearchIndexConfig;
pub use errors::SearchError;
pub use interfaces::IndexOperation;
pub use opensearch::OpenSearchIndexOperation;
pub use types::{
    BulkErrorGroup, BulkItem, BulkItemError, BulkOperationKind, BulkRequest, BulkResponse,
    DeleteByQueryRequest,
};
