//! Batching of the input record stream.

use futures::stream::{Chunks, Stream, StreamExt};

use crate::errors::IndexerError;
use search_indexer_shared::Record;

/// Lazily grouped records. Each item is a batch of `batch_size` records
/// except possibly the last.
pub type BatchStream<S> = Chunks<S>;

/// Split a single-pass record stream into batches.
///
/// At most one batch is buffered at a time and input order is preserved.
/// The stream is consumed; it must not be iterated again.
pub fn chunk_records<S>(records: S, batch_size: usize) -> Result<BatchStream<S>, IndexerError>
where
    S: Stream<Item = Record>,
{
    if batch_size == 0 {
        return Err(IndexerError::InvalidBatchSize(batch_size));
    }

    Ok(records.chunks(batch_size))
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;
    use serde_json::json;

    fn record(id: usize) -> Record {
        let mut record = Record::new();
        record.insert("id".to_string(), json!(id));
        record
    }

    fn records(count: usize) -> Vec<Record> {
        (0..count).map(record).collect()
    }

    #[tokio::test]
    async fn test_batch_sizes() {
        let batches: Vec<_> = chunk_records(stream::iter(records(5)), 2)
            .unwrap()
            .collect()
            .await;

        let sizes: Vec<usize> = batches.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![2, 2, 1]);
    }

    #[tokio::test]
    async fn test_batch_count_is_ceiling() {
        for len in 0..12 {
            for size in 1..6 {
                let batches: Vec<_> = chunk_records(stream::iter(records(len)), size)
                    .unwrap()
                    .collect()
                    .await;

                assert_eq!(batches.len(), len.div_ceil(size), "len={len} size={size}");
                if let Some((last, full)) = batches.split_last() {
                    assert!(full.iter().all(|b| b.len() == size));
                    assert!(!last.is_empty() && last.len() <= size);
                }
            }
        }
    }

    #[tokio::test]
    async fn test_preserves_order() {
        let batches: Vec<_> = chunk_records(stream::iter(records(7)), 3)
            .unwrap()
            .collect()
            .await;

        let ids: Vec<u64> = batches
            .into_iter()
            .flatten()
            .map(|r| r["id"].as_u64().unwrap())
            .collect();
        assert_eq!(ids, (0..7).collect::<Vec<u64>>());
    }

    #[tokio::test]
    async fn test_unbounded_input_is_read_lazily() {
        let mut batches = chunk_records(stream::iter(0..).map(record), 4).unwrap();

        let first = batches.next().await.unwrap();
        assert_eq!(first.len(), 4);
        assert_eq!(first[3]["id"], 3);
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let result = chunk_records(stream::iter(records(3)), 0);
        assert!(matches!(result, Err(IndexerError::InvalidBatchSize(0))));
    }
}
