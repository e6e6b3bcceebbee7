pub mod dice;
pub mod game;
pub mod history;
pub mod roller;
pub mod session;

pub use dice::{Dice, RollOutcome, Winner, MAX_FACE, MIN_FACE};
pub use game::{CurrentGame, GameId, GameStatus};
pub use history::{GameHistoryRecord, HISTORY_LIMIT};
pub use roller::DiceRoller;
pub use session::{SessionStats, SESSION_ID};

use thiserror::Error;

/// Returned when a stored enum value does not match any known variant.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unrecognised {kind}: {value:?}")]
pub struct ParseError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseError {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}
