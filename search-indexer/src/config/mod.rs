//! Configuration and wiring for the search indexer.

mod dependencies;
mod env;
mod logging;

pub use dependencies::Dependencies;
pub use env::{load_search_config, search_config_from};
pub use logging::init_tracing;
