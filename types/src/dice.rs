use std::{cmp::Ordering, fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{DiceRoller, ParseError};

pub const MIN_FACE: u8 = 1;
pub const MAX_FACE: u8 = 6;

/// A pair of die faces, one side's throw.
pub type Dice = [u8; 2];

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Winner {
    Player,
    Computer,
    Tie,
}

impl Winner {
    /// Higher total wins, equal totals tie.
    pub fn decide(player_total: u8, computer_total: u8) -> Self {
        match player_total.cmp(&computer_total) {
            Ordering::Greater => Winner::Player,
            Ordering::Less => Winner::Computer,
            Ordering::Equal => Winner::Tie,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Winner::Player => "player",
            Winner::Computer => "computer",
            Winner::Tie => "tie",
        }
    }
}

impl Display for Winner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Winner {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "player" => Ok(Winner::Player),
            "computer" => Ok(Winner::Computer),
            "tie" => Ok(Winner::Tie),
            other => Err(ParseError::new("winner", other)),
        }
    }
}

/// Result of one roll: both sides' dice, their totals and the winner.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollOutcome {
    pub player_dice: Dice,
    pub computer_dice: Dice,
    pub winner: Winner,
    pub player_total: u8,
    pub computer_total: u8,
}

impl RollOutcome {
    pub fn from_dice(player_dice: Dice, computer_dice: Dice) -> Self {
        let player_total = player_dice.iter().sum();
        let computer_total = computer_dice.iter().sum();
        Self {
            player_dice,
            computer_dice,
            winner: Winner::decide(player_total, computer_total),
            player_total,
            computer_total,
        }
    }

    /// Four independent draws: two for the player, then two for the computer.
    pub fn roll(roller: &dyn DiceRoller) -> Self {
        let player_dice = roller.roll_pair();
        let computer_dice = roller.roll_pair();
        Self::from_dice(player_dice, computer_dice)
    }
}

impl Display for RollOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "player {:?}={} computer {:?}={} -> {}",
            self.player_dice, self.player_total, self.computer_dice, self.computer_total, self.winner
        )
    }
}
