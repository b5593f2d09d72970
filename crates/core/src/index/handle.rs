use std::sync::Arc;

use tokio::sync::RwLock;

use super::types::SourceIndex;

/// Shared handle to the currently published index.
///
/// Readers take an `Arc` snapshot and never see a partially built index;
/// writers build a complete index elsewhere and swap it in with `publish`.
#[derive(Debug, Clone, Default)]
pub struct IndexHandle {
    current: Arc<RwLock<Arc<SourceIndex>>>,
}

impl IndexHandle {
    pub fn new(index: SourceIndex) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(index))),
        }
    }

    pub async fn snapshot(&self) -> Arc<SourceIndex> {
        self.current.read().await.clone()
    }

    pub async fn publish(&self, index: SourceIndex) {
        *self.current.write().await = Arc::new(index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{EntityType, ItemRecord, SourceRecord};

    #[tokio::test]
    async fn test_snapshot_survives_publish() {
        let handle = IndexHandle::default();
        let before = handle.snapshot().await;

        let mut next = SourceIndex::new();
        next.insert(
            "Morning Mix",
            SourceRecord::Playlist(ItemRecord {
                id: "3".to_string(),
            }),
        );
        handle.publish(next).await;

        assert!(before.is_empty(EntityType::Playlist));
        assert_eq!(handle.snapshot().await.len(EntityType::Playlist), 1);
    }

    #[tokio::test]
    async fn test_clones_share_the_published_index() {
        let handle = IndexHandle::default();
        let other = handle.clone();

        let mut next = SourceIndex::new();
        next.insert(
            "News",
            SourceRecord::Podcast(ItemRecord {
                id: "p.1".to_string(),
            }),
        );
        handle.publish(next).await;

        assert_eq!(other.snapshot().await.len(EntityType::Podcast), 1);
    }
}
