//! OpenSearch implementation of the index operation interface.
//!
//! This module provides a concrete implementation of `IndexOperation`
//! using OpenSearch as the backend.

mod client;
mod index_config;
pub(crate) mod queries;

pub use client::OpenSearchIndexOperation;
pub use index_config::build_index_body;
