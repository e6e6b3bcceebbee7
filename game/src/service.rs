use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use database::{retry_with_backoff, HistoryStore, RetryPolicy, SessionStore};
use rollers::RandomRoller;
use tokio::task::JoinSet;
use types::{
    CurrentGame, DiceRoller, GameHistoryRecord, GameId, RollOutcome, SessionStats, HISTORY_LIMIT,
};

use crate::GameError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetOutcome {
    pub game_id: GameId,
    pub stats: SessionStats,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatsSnapshot {
    pub stats: SessionStats,
    pub player_win_rate: f64,
}

impl From<SessionStats> for StatsSnapshot {
    fn from(stats: SessionStats) -> Self {
        Self {
            player_win_rate: stats.player_win_rate(),
            stats,
        }
    }
}

/// Runs a game's lifecycle against the session store and records finished games in the history store.
pub struct GameService {
    sessions: SessionStore,
    history: Arc<dyn HistoryStore>,
    roller: Arc<dyn DiceRoller>,
    history_retry: RetryPolicy,
    history_writes: Mutex<JoinSet<()>>,
}

impl GameService {
    pub fn new(sessions: SessionStore, history: Arc<dyn HistoryStore>) -> Self {
        Self {
            sessions,
            history,
            roller: Arc::new(RandomRoller),
            history_retry: RetryPolicy::default(),
            history_writes: Mutex::new(JoinSet::new()),
        }
    }

    pub fn with_roller(mut self, roller: Arc<dyn DiceRoller>) -> Self {
        self.roller = roller;
        self
    }

    pub fn with_history_retry(mut self, policy: RetryPolicy) -> Self {
        self.history_retry = policy;
        self
    }

    /// Replaces whatever game was current with a freshly started one.
    pub async fn start_game(&self) -> Result<GameId, GameError> {
        let game = CurrentGame::start(GameId::generate(), Utc::now());

        let mut tx = self.sessions.begin().await?;
        tx.replace_current_game(&game).await?;
        tx.commit().await?;

        log::info!("Started game {}", game.id);
        Ok(game.id)
    }

    /// Zeroes the session tally and starts a new game, atomically.
    pub async fn reset_game(&self) -> Result<ResetOutcome, GameError> {
        let mut tx = self.sessions.begin().await?;
        if tx.current_game().await?.is_none() {
            return Err(GameError::NotFound);
        }

        let stats = tx.reset_session().await?;
        let game = CurrentGame::start(GameId::generate(), Utc::now());
        tx.replace_current_game(&game).await?;
        tx.commit().await?;

        log::info!("Reset session, started game {}", game.id);
        Ok(ResetOutcome {
            game_id: game.id,
            stats,
        })
    }

    /// Rolls the current game. The session tally and the game's completion
    /// commit together; the history record is written by a background task
    /// afterwards and a failure there is logged, not returned.
    pub async fn roll_dice(&self) -> Result<RollOutcome, GameError> {
        let mut tx = self.sessions.begin().await?;
        let mut game = tx.current_game().await?.ok_or(GameError::NotFound)?;
        if game.is_completed() {
            return Err(GameError::AlreadyCompleted(game.id));
        }

        let outcome = RollOutcome::roll(self.roller.as_ref());
        game.complete(&outcome);
        tx.record_result(outcome.winner).await?;
        if !tx.complete_game(&game).await? {
            tx.rollback().await?;
            return Err(GameError::TransactionAborted(format!(
                "game {} was no longer in progress",
                game.id
            )));
        }
        tx.commit().await?;
        log::info!("Game {}: {}", game.id, outcome);

        let record = GameHistoryRecord::from_outcome(game.id, Utc::now(), &outcome);
        self.record_history(record);

        Ok(outcome)
    }

    pub async fn stats(&self) -> Result<StatsSnapshot, GameError> {
        let stats = self.sessions.stats().await?;
        Ok(StatsSnapshot::from(stats))
    }

    /// The most recent completed games, newest first.
    pub async fn history(&self) -> Result<Vec<GameHistoryRecord>, GameError> {
        Ok(self.history.recent(HISTORY_LIMIT).await?)
    }

    /// Waits for every history write spawned so far, retries included.
    pub async fn flush_history(&self) {
        let mut writes = std::mem::take(&mut *self.history_writes());
        while let Some(joined) = writes.join_next().await {
            if let Err(e) = joined {
                log::error!("History write task failed: {e}");
            }
        }
    }

    pub async fn shutdown(&self) {
        self.flush_history().await;
        if let Err(e) = self.history.close().await {
            log::error!("Failed to close history store: {e}");
        }
        self.sessions.close().await;
        log::info!("Stores closed");
    }

    fn history_writes(&self) -> MutexGuard<'_, JoinSet<()>> {
        match self.history_writes.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn record_history(&self, record: GameHistoryRecord) {
        let history = Arc::clone(&self.history);
        let policy = self.history_retry;
        let record = Arc::new(record);

        let mut writes = self.history_writes();
        // reap finished writes so the set only holds the ones still running
        while writes.try_join_next().is_some() {}
        writes.spawn(async move {
            let result = retry_with_backoff("history write", policy, || {
                let history = Arc::clone(&history);
                let record = Arc::clone(&record);
                Box::pin(async move { history.append(&record).await })
            })
            .await;

            if let Err(e) = result {
                // the roll is already committed; the two stores now disagree about this game
                log::error!(
                    "Game {} committed without a history record: {e}",
                    record.id
                );
            }
        });
    }
}
