use async_trait::async_trait;
use tokio::sync::RwLock;
use types::GameHistoryRecord;

use super::HistoryStore;
use crate::DatabaseError;

/// Keeps history in process memory. Used when no document store is wanted, and in tests.
#[derive(Debug, Default)]
pub struct MemoryHistoryStore {
    records: RwLock<Vec<GameHistoryRecord>>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn append(&self, record: &GameHistoryRecord) -> Result<(), DatabaseError> {
        self.records.write().await.push(record.clone());
        Ok(())
    }

    async fn recent(&self, limit: usize) -> Result<Vec<GameHistoryRecord>, DatabaseError> {
        let mut records = self.records.read().await.clone();
        records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        records.truncate(limit);
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use types::{GameId, RollOutcome};

    #[tokio::test]
    async fn test_recent_is_newest_first_and_limited() {
        let store = MemoryHistoryStore::new();
        let base = Utc::now();
        let outcome = RollOutcome::from_dice([2, 3], [4, 1]);

        // appended out of order on purpose
        for minutes in [5, 1, 12, 3, 8, 0, 11, 7, 2, 9, 4, 10, 6] {
            let record = GameHistoryRecord::from_outcome(
                GameId::from(format!("game-{minutes}")),
                base + Duration::minutes(minutes),
                &outcome,
            );
            store.append(&record).await.unwrap();
        }
        assert_eq!(store.len().await, 13);

        let recent = store.recent(10).await.unwrap();
        assert_eq!(recent.len(), 10);
        assert_eq!(recent[0].id, GameId::from("game-12"));
        assert_eq!(recent[9].id, GameId::from("game-3"));
        assert!(recent.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));
    }

    #[tokio::test]
    async fn test_empty_store() {
        let store = MemoryHistoryStore::new();
        assert!(store.is_empty().await);
        assert!(store.recent(10).await.unwrap().is_empty());
    }
}
