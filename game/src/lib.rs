pub mod error;
pub mod service;

pub use error::GameError;
pub use service::{GameService, ResetOutcome, StatsSnapshot};
