//! Search error types.
//!
//! This module defines the error types that can occur while talking to the
//! search backend.

use thiserror::Error;

/// Errors that can occur during search backend operations.
#[derive(Error, Debug, Clone)]
pub enum SearchError {
    /// Indexing is switched off in configuration.
    #[error("Search backend connection is disabled")]
    ConnectionDisabled,

    /// The backend could not be reached.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The backend rejected a request, e.g. for missing privileges.
    #[error("Request error: {0}")]
    RequestError(String),

    /// No index exists under the expected name.
    #[error("Index not found: {0}")]
    IndexNotFound(String),

    /// Failed to create the search index.
    #[error("Index creation error: {0}")]
    IndexCreationError(String),

    /// The bulk request as a whole was rejected.
    #[error("Bulk error: {0}")]
    BulkError(String),

    /// Failed to refresh an index.
    #[error("Refresh error: {0}")]
    RefreshError(String),

    /// Delete-by-query request failed.
    #[error("Delete by query error: {0}")]
    DeleteByQueryError(String),

    /// Failed to parse response from the backend.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// A document cannot be turned into a bulk operation.
    #[error("Invalid document: {0}")]
    InvalidDocument(String),
}

impl SearchError {
    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create a request error.
    pub fn request(msg: impl Into<String>) -> Self {
        Self::RequestError(msg.into())
    }

    /// Create an index not found error.
    pub fn index_not_found(index: impl Into<String>) -> Self {
        Self::IndexNotFound(index.into())
    }

    /// Create an index creation error.
    pub fn index_creation(msg: impl Into<String>) -> Self {
        Self::IndexCreationError(msg.into())
    }

    /// Create a bulk error.
    pub fn bulk(msg: impl Into<String>) -> Self {
        Self::BulkError(msg.into())
    }

    /// Create a refresh error.
    pub fn refresh(msg: impl Into<String>) -> Self {
        Self::RefreshError(msg.into())
    }

    /// Create a delete-by-query error.
    pub fn delete_by_query(msg: impl Into<String>) -> Self {
        Self::DeleteByQueryError(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    /// Create an invalid document error.
    pub fn invalid_document(msg: impl Into<String>) -> Self {
        Self::InvalidDocument(msg.into())
    }

    /// Whether the backend is disabled or unreachable, as opposed to
    /// rejecting a particular request.
    pub fn is_transport_failure(&self) -> bool {
        matches!(self, Self::ConnectionDisabled | Self::ConnectionError(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_failures() {
        assert!(SearchError::ConnectionDisabled.is_transport_failure());
        assert!(SearchError::connection("refused").is_transport_failure());
        assert!(!SearchError::bulk("413").is_transport_failure());
        assert!(!SearchError::request("403 Forbidden").is_transport_failure());
        assert!(!SearchError::index_not_found("catalog_default").is_transport_failure());
    }
}
