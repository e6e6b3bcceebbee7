use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Dice, GameId, RollOutcome, Winner};

/// Most records returned by a history query.
pub const HISTORY_LIMIT: usize = 10;

/// Immutable record of one completed game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameHistoryRecord {
    pub id: GameId,
    pub timestamp: DateTime<Utc>,
    pub winner: Winner,
    pub player_score: u8,
    pub computer_score: u8,
    pub player_dice: Dice,
    pub computer_dice: Dice,
}

impl GameHistoryRecord {
    pub fn from_outcome(id: GameId, timestamp: DateTime<Utc>, outcome: &RollOutcome) -> Self {
        Self {
            id,
            timestamp,
            winner: outcome.winner,
            player_score: outcome.player_total,
            computer_score: outcome.computer_total,
            player_dice: outcome.player_dice,
            computer_dice: outcome.computer_dice,
        }
    }
}
