//! Error types for the indexing pipeline.

use search_indexer_repository::SearchError;
use search_indexer_shared::DataProviderError;
use thiserror::Error;

/// Errors that can occur while indexing or cleaning up documents.
#[derive(Error, Debug)]
pub enum IndexerError {
    /// A backend operation failed for a specific index and type.
    #[error("{operation} failed for index {index} (type {type_name}): {source}")]
    OperationError {
        operation: &'static str,
        index: String,
        type_name: String,
        #[source]
        source: SearchError,
    },

    /// The index has no type with the handler's type name.
    #[error("Type {type_name} is not defined for index {index}")]
    UnknownType { index: String, type_name: String },

    /// A data provider failed to enrich a batch.
    #[error("Data provider '{provider}' failed: {source}")]
    DataProviderError {
        provider: String,
        #[source]
        source: DataProviderError,
    },

    /// A field value could not be cast to its mapped type.
    #[error(transparent)]
    TypeCastError(#[from] TypeCastError),

    /// Batch size must be positive.
    #[error("Invalid batch size: {0}")]
    InvalidBatchSize(usize),
}

impl IndexerError {
    /// Create an operation error.
    pub fn operation(
        operation: &'static str,
        index: impl Into<String>,
        type_name: impl Into<String>,
        source: SearchError,
    ) -> Self {
        Self::OperationError {
            operation,
            index: index.into(),
            type_name: type_name.into(),
            source,
        }
    }

    /// Create a data provider error.
    pub fn data_provider(provider: impl Into<String>, source: DataProviderError) -> Self {
        Self::DataProviderError {
            provider: provider.into(),
            source,
        }
    }

    /// Whether the underlying cause is a disabled or unreachable backend.
    pub fn is_transport_failure(&self) -> bool {
        match self {
            Self::OperationError { source, .. } => source.is_transport_failure(),
            _ => false,
        }
    }
}

/// A field value that cannot be represented as its mapped type.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Cannot cast field '{field}' value {value} to {expected}")]
pub struct TypeCastError {
    /// Dotted path of the field.
    pub field: String,
    /// Mapped type name.
    pub expected: &'static str,
    /// The offending value, as JSON.
    pub value: String,
}
