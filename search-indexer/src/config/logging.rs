//! Tracing subscriber setup.

use std::env;

use tracing_subscriber::EnvFilter;

use crate::IndexingError;

const LOG_FORMAT: &str = "SEARCH_INDEXER_LOG_FORMAT";

/// Install the global tracing subscriber.
///
/// The filter comes from `RUST_LOG` and defaults to `info`. Setting
/// `SEARCH_INDEXER_LOG_FORMAT=json` switches to JSON lines.
///
/// Fails if a global subscriber is already installed.
pub fn init_tracing() -> Result<(), IndexingError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let result = if json_requested(env::var(LOG_FORMAT).ok().as_deref()) {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    result.map_err(|e| IndexingError::config(format!("Failed to install tracing subscriber: {}", e)))
}

fn json_requested(format: Option<&str>) -> bool {
    format.is_some_and(|f| f.trim().eq_ignore_ascii_case("json"))
}
