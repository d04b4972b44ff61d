//! # Search Indexer Pipeline
//!
//! This crate provides the pipeline components for indexing a stream of
//! records into per-store OpenSearch indices.
//!
//! ## Architecture
//!
//! Each batch flows through the same stages:
//!
//! 1. **Batch**: Splits the record stream into fixed-size batches
//! 2. **Processor**: Enriches records with data providers and casts fields
//! 3. **Loader**: Reports per-document bulk failures
//! 4. **Handler**: Coordinates the flow, refreshes the index and cleans up
//!    documents from previous runs

pub mod batch;
pub mod errors;
pub mod events;
pub mod handler;
pub mod loader;
pub mod processor;
pub mod transaction_key;

pub use errors::{IndexerError, TypeCastError};
pub use events::{BroadcastSaveListener, NoopSaveListener, SaveDocumentsListener, SavedDocuments, SavedDocumentsEvent};
pub use handler::{CleanupOutcome, GenericIndexerHandler, IndexOutcome, IndexingSummary};
pub use transaction_key::{FixedTransactionKey, TimestampTransactionKey, TransactionKeyProvider};
