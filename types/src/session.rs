use serde::{Deserialize, Serialize};

use crate::Winner;

/// Key of the single current-session row.
pub const SESSION_ID: i64 = 1;

/// Cumulative tally since the last reset.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStats {
    pub total_games: i64,
    pub player_wins: i64,
    pub computer_wins: i64,
    pub ties: i64,
}

impl SessionStats {
    pub fn record(&mut self, winner: Winner) {
        self.total_games += 1;
        match winner {
            Winner::Player => self.player_wins += 1,
            Winner::Computer => self.computer_wins += 1,
            Winner::Tie => self.ties += 1,
        }
    }

    pub fn is_consistent(&self) -> bool {
        self.total_games == self.player_wins + self.computer_wins + self.ties
    }

    /// Percentage of games the player won, to one decimal place. Zero when no games were played.
    pub fn player_win_rate(&self) -> f64 {
        if self.total_games == 0 {
            return 0.0;
        }
        let rate = self.player_wins as f64 / self.total_games as f64 * 100.0;
        (rate * 10.0).round() / 10.0
    }
}
