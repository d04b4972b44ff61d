//! Loader module for the indexing pipeline.
//!
//! Reports the per-document outcome of bulk loads.

mod bulk_errors;

pub use bulk_errors::{log_bulk_errors, BulkErrorReport, FAILED_IDS_SAMPLE_SIZE};
