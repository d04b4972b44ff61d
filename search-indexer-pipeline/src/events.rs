//! Notifications emitted after documents are saved.

use tokio::sync::broadcast;
use tracing::debug;

use search_indexer_repository::BulkResponse;

/// Payload published after each saved batch.
#[derive(Debug, Clone, Copy)]
pub struct SavedDocumentsEvent<'a> {
    /// Name of the type the batch was written for.
    pub data_type: &'a str,
    pub bulk_response: &'a BulkResponse,
}

/// Observer of saved batches, e.g. for cache invalidation.
///
/// Called synchronously on the indexing task; implementations should not
/// block.
pub trait SaveDocumentsListener: Send + Sync {
    fn documents_saved(&self, event: &SavedDocumentsEvent<'_>);
}

/// Listener that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSaveListener;

impl SaveDocumentsListener for NoopSaveListener {
    fn documents_saved(&self, _event: &SavedDocumentsEvent<'_>) {}
}

/// Owned copy of a [`SavedDocumentsEvent`].
#[derive(Debug, Clone)]
pub struct SavedDocuments {
    pub data_type: String,
    pub bulk_response: BulkResponse,
}

/// Forwards saved batches to subscribers of a broadcast channel.
pub struct BroadcastSaveListener {
    sender: broadcast::Sender<SavedDocuments>,
}

impl BroadcastSaveListener {
    /// Create a listener and its first receiver.
    pub fn new(capacity: usize) -> (Self, broadcast::Receiver<SavedDocuments>) {
        let (sender, receiver) = broadcast::channel(capacity);
        (Self { sender }, receiver)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SavedDocuments> {
        self.sender.subscribe()
    }
}

impl SaveDocumentsListener for BroadcastSaveListener {
    fn documents_saved(&self, event: &SavedDocumentsEvent<'_>) {
        let message = SavedDocuments {
            data_type: event.data_type.to_string(),
            bulk_response: event.bulk_response.clone(),
        };

        if self.sender.send(message).is_err() {
            debug!(data_type = %event.data_type, "No subscribers for saved documents event");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_broadcast_listener_forwards_events() {
        let (listener, mut receiver) = BroadcastSaveListener::new(4);
        let mut late = listener.subscribe();
        let response = BulkResponse::new(3, Vec::new());

        listener.documents_saved(&SavedDocumentsEvent {
            data_type: "product",
            bulk_response: &response,
        });

        let event = receiver.recv().await.unwrap();
        assert_eq!(event.data_type, "product");
        assert_eq!(event.bulk_response.took(), 3);
        assert_eq!(late.recv().await.unwrap().data_type, "product");
    }

    #[test]
    fn test_broadcast_without_subscribers_does_not_panic() {
        let (listener, receiver) = BroadcastSaveListener::new(1);
        drop(receiver);

        listener.documents_saved(&SavedDocumentsEvent {
            data_type: "product",
            bulk_response: &BulkResponse::empty(),
        });
    }
}
