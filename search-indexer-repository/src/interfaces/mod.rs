//! Interface definitions for the search backend.
//!
//! This module defines the abstract `IndexOperation` trait that allows
//! for dependency injection and swappable search backend implementations.

mod index_operation;

pub use index_operation::IndexOperation;
