pub mod memory;
pub mod mongo;

pub use memory::MemoryHistoryStore;
pub use mongo::MongoHistoryStore;

use async_trait::async_trait;
use types::GameHistoryRecord;

use crate::DatabaseError;

/// Append-only store of completed games.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn append(&self, record: &GameHistoryRecord) -> Result<(), DatabaseError>;

    /// At most `limit` records, newest first.
    async fn recent(&self, limit: usize) -> Result<Vec<GameHistoryRecord>, DatabaseError>;

    async fn close(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}
