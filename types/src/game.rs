use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{ParseError, RollOutcome, Winner};

/// Identifier of a game, shared by its current-game row and its history record.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(String);

impl GameId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for GameId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for GameId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl Display for GameId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    Started,
    Completed,
}

impl GameStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameStatus::Started => "started",
            GameStatus::Completed => "completed",
        }
    }
}

impl Display for GameStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for GameStatus {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "started" => Ok(GameStatus::Started),
            "completed" => Ok(GameStatus::Completed),
            other => Err(ParseError::new("game status", other)),
        }
    }
}

/// The game currently in play. Moves `Started -> Completed` exactly once.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentGame {
    pub id: GameId,
    pub status: GameStatus,
    pub timestamp: DateTime<Utc>,
    pub player_score: i64,
    pub computer_score: i64,
    pub winner: Option<Winner>,
}

impl CurrentGame {
    pub fn start(id: GameId, timestamp: DateTime<Utc>) -> Self {
        Self {
            id,
            status: GameStatus::Started,
            timestamp,
            player_score: 0,
            computer_score: 0,
            winner: None,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == GameStatus::Completed
    }

    pub fn complete(&mut self, outcome: &RollOutcome) {
        self.status = GameStatus::Completed;
        self.player_score = i64::from(outcome.player_total);
        self.computer_score = i64::from(outcome.computer_total);
        self.winner = Some(outcome.winner);
    }
}
