pub mod config;
pub mod error;
pub mod history;
pub mod retry;
pub mod session_store;


pub use config::{DatabaseConfig, HistoryConfig};
pub use error::DatabaseError;
pub use history::{HistoryStore, MemoryHistoryStore, MongoHistoryStore};
pub use retry::{retry_with_backoff, RetryPolicy};
pub use session_store::{SessionStore, SessionTransaction};

/// Opens an in-memory session store with the schema applied.
pub async fn in_memory_session_store() -> Result<SessionStore, DatabaseError> {
    let pool = DatabaseConfig::in_memory().create_pool().await?;
    let store = SessionStore::new(pool);
    store.run_migrations().await?;
    Ok(store)
}
