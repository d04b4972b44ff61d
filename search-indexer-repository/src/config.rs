//! Configuration types for the search backend.

/// Default number of records per bulk request.
pub const DEFAULT_BATCH_INDEXING_SIZE: usize = 1000;

/// Configuration for the OpenSearch index operation.
#[derive(Debug, Clone)]
pub struct SearchIndexConfig {
    /// Backend URL, e.g. `http://localhost:9200`.
    pub url: String,
    /// When false, every backend call fails with `ConnectionDisabled`
    /// without touching the network.
    pub enabled: bool,
    /// Number of records sent per bulk request.
    pub batch_indexing_size: usize,
    /// Primary shards for newly created indices.
    pub number_of_shards: u32,
    /// Replicas for newly created indices.
    pub number_of_replicas: u32,
}

impl Default for SearchIndexConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:9200".to_string(),
            enabled: true,
            batch_indexing_size: DEFAULT_BATCH_INDEXING_SIZE,
            number_of_shards: 1,
            number_of_replicas: 0,
        }
    }
}

impl SearchIndexConfig {
    /// Create a config pointing at the given URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Create a config with indexing switched off.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Set the number of records per bulk request.
    pub fn with_batch_indexing_size(mut self, batch_indexing_size: usize) -> Self {
        self.batch_indexing_size = batch_indexing_size;
        self
    }

    /// Set shard and replica counts for new indices.
    pub fn with_shards(mut self, number_of_shards: u32, number_of_replicas: u32) -> Self {
        self.number_of_shards = number_of_shards;
        self.number_of_replicas = number_of_replicas;
        self
    }
}
