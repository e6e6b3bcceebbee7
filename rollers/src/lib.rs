use std::{collections::VecDeque, sync::Mutex};

use rand::{thread_rng, Rng};
use types::{DiceRoller, MAX_FACE, MIN_FACE};

/// Uniform, independent faces from the thread-local RNG.
#[derive(Debug, Default)]
pub struct RandomRoller;

impl DiceRoller for RandomRoller {
    fn roll_die(&self) -> u8 {
        thread_rng().gen_range(MIN_FACE..=MAX_FACE)
    }
}

/// Replays a fixed script of faces, cycling when it runs out.
///
/// Faces are handed out in draw order, so `[6, 6, 1, 1]` gives the player a
/// double six and the computer snake eyes.
#[derive(Debug)]
pub struct FixedRoller {
    script: Vec<u8>,
    queue: Mutex<VecDeque<u8>>,
}

impl FixedRoller {
    /// Faces outside `MIN_FACE..=MAX_FACE` are clamped; an empty script always rolls `MIN_FACE`.
    pub fn new(faces: impl IntoIterator<Item = u8>) -> Self {
        let script: Vec<u8> = faces
            .into_iter()
            .map(|face| face.clamp(MIN_FACE, MAX_FACE))
            .collect();
        Self {
            queue: Mutex::new(script.iter().copied().collect()),
            script,
        }
    }
}

impl DiceRoller for FixedRoller {
    fn roll_die(&self) -> u8 {
        let mut queue = match self.queue.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if queue.is_empty() {
            log::debug!("fixed roller script exhausted, restarting");
            queue.extend(self.script.iter().copied());
        }
        queue.pop_front().unwrap_or(MIN_FACE)
    }
}
