//! Results of handler calls.

/// Counters for one indexing call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexingSummary {
    /// Bulk requests sent.
    pub batches: usize,
    /// Documents submitted across all bulk requests.
    pub documents: usize,
    /// Documents the backend reported as failed.
    pub failed_documents: usize,
    /// Batches left empty after enrichment and therefore not sent.
    pub skipped_empty_batches: usize,
}

impl IndexingSummary {
    pub(crate) fn record_batch(&mut self, documents: usize, failed: usize) {
        self.batches += 1;
        self.documents += documents;
        self.failed_documents += failed;
    }
}

/// Outcome of `save_index` / `update_index`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexOutcome {
    /// The input was processed and the index refreshed.
    Indexed(IndexingSummary),
    /// None of the requested data providers exist on the type; nothing was read.
    Skipped,
    /// The backend is disabled or unreachable; the call ended early.
    TransportDisabled,
}

/// Outcome of `clean_up_by_transaction_key`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanupOutcome {
    /// The delete-by-query ran.
    Deleted { deleted: u64 },
    /// There is no index for the store, so nothing to clean.
    IndexMissing,
    /// The backend is disabled or unreachable.
    TransportDisabled,
}
