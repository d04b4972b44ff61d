//! # Search Indexer
//!
//! Entry point for embedding the generic document indexer.
//!
//! This crate loads the backend configuration from the environment,
//! installs the tracing subscriber and wires the OpenSearch backend into
//! per-type indexer handlers.

pub mod config;

pub use config::{init_tracing, load_search_config, Dependencies};

use thiserror::Error;

/// Errors that can occur during indexer initialization or execution.
#[derive(Error, Debug)]
pub enum IndexingError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Indexing error.
    #[error("Indexer error: {0}")]
    IndexerError(#[from] search_indexer_pipeline::IndexerError),
}

impl IndexingError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
