//! Processor module for the indexing pipeline.
//!
//! Transforms each batch before it is loaded: data providers enrich the
//! records, then the type caster normalizes field values to the type
//! mapping.

mod enrichment;
mod type_caster;

pub use enrichment::DataProviderPipeline;
pub use type_caster::TypeCaster;
