//! Search backend configuration from environment variables.

use std::env;
use std::str::FromStr;

use tracing::info;

use crate::IndexingError;
use search_indexer_repository::SearchIndexConfig;

const OPENSEARCH_URL: &str = "OPENSEARCH_URL";
const SEARCH_INDEXER_ENABLED: &str = "SEARCH_INDEXER_ENABLED";
const SEARCH_BATCH_INDEXING_SIZE: &str = "SEARCH_BATCH_INDEXING_SIZE";
const SEARCH_INDEX_SHARDS: &str = "SEARCH_INDEX_SHARDS";
const SEARCH_INDEX_REPLICAS: &str = "SEARCH_INDEX_REPLICAS";

/// Load the search backend configuration from the process environment.
///
/// A `.env` file in the working directory is read first when present.
///
/// # Environment Variables
///
/// - `OPENSEARCH_URL`: OpenSearch server URL (default: http://localhost:9200)
/// - `SEARCH_INDEXER_ENABLED`: `false`/`0`/`no`/`off` disables every backend call (default: true)
/// - `SEARCH_BATCH_INDEXING_SIZE`: records per bulk request (default: 1000)
/// - `SEARCH_INDEX_SHARDS`: primary shards of new indices (default: 1)
/// - `SEARCH_INDEX_REPLICAS`: replicas of new indices (default: 0)
pub fn load_search_config() -> Result<SearchIndexConfig, IndexingError> {
    dotenv::dotenv().ok();

    let config = search_config_from(|key| env::var(key).ok())?;

    info!(
        url = %config.url,
        enabled = config.enabled,
        batch_indexing_size = config.batch_indexing_size,
        shards = config.number_of_shards,
        replicas = config.number_of_replicas,
        "Loaded search configuration"
    );

    Ok(config)
}

/// Build the configuration from an arbitrary variable lookup.
///
/// Unset or blank variables keep their defaults.
pub fn search_config_from<F>(lookup: F) -> Result<SearchIndexConfig, IndexingError>
where
    F: Fn(&str) -> Option<String>,
{
    let value = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

    let mut config = SearchIndexConfig::default();

    if let Some(url) = value(OPENSEARCH_URL) {
        config.url = url;
    }
    if let Some(enabled) = value(SEARCH_INDEXER_ENABLED) {
        config.enabled = parse_flag(SEARCH_INDEXER_ENABLED, &enabled)?;
    }
    if let Some(size) = value(SEARCH_BATCH_INDEXING_SIZE) {
        config.batch_indexing_size = parse_number(SEARCH_BATCH_INDEXING_SIZE, &size)?;
        if config.batch_indexing_size == 0 {
            return Err(IndexingError::config(format!(
                "{} must be greater than zero",
                SEARCH_BATCH_INDEXING_SIZE
            )));
        }
    }
    if let Some(shards) = value(SEARCH_INDEX_SHARDS) {
        config.number_of_shards = parse_number(SEARCH_INDEX_SHARDS, &shards)?;
    }
    if let Some(replicas) = value(SEARCH_INDEX_REPLICAS) {
        config.number_of_replicas = parse_number(SEARCH_INDEX_REPLICAS, &replicas)?;
    }

    Ok(config)
}

fn parse_flag(key: &str, value: &str) -> Result<bool, IndexingError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(IndexingError::config(format!(
            "{} must be a boolean, got '{}'",
            key, other
        ))),
    }
}

fn parse_number<T: FromStr>(key: &str, value: &str) -> Result<T, IndexingError> {
    value.parse().map_err(|_| {
        IndexingError::config(format!("{} must be a non-negative integer, got '{}'", key, value))
    })
}
