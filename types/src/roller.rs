use std::fmt::Debug;

use crate::Dice;

/// Source of die faces. Shared between concurrent requests, so it takes `&self`.
pub trait DiceRoller: Debug + Send + Sync {
    /// One face in `MIN_FACE..=MAX_FACE`.
    fn roll_die(&self) -> u8;

    fn roll_pair(&self) -> Dice {
        [self.roll_die(), self.roll_die()]
    }
}
