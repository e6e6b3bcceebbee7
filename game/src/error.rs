use database::DatabaseError;
use thiserror::Error;
use types::GameId;

#[derive(Error, Debug)]
pub enum GameError {
    #[error("No active game found")]
    NotFound,

    #[error("Game {0} is already completed")]
    AlreadyCompleted(GameId),

    #[error("Transaction aborted: {0}")]
    TransactionAborted(String),

    #[error(transparent)]
    Storage(#[from] DatabaseError),
}
