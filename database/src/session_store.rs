use sqlx::{sqlite::SqliteRow, Row, Sqlite, SqlitePool, Transaction};
use types::{CurrentGame, GameId, GameStatus, SessionStats, Winner, SESSION_ID};

use crate::DatabaseError;

/// Relational store for the current game and the running session tally.
///
/// Every mutation goes through a [`SessionTransaction`]; nothing becomes
/// visible to other readers until [`SessionTransaction::commit`].
#[derive(Debug, Clone)]
pub struct SessionStore {
    pool: SqlitePool,
}

impl SessionStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn run_migrations(&self) -> Result<(), DatabaseError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| DatabaseError::Migration(e.to_string()))?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Opens a write transaction. `BEGIN IMMEDIATE` takes the write lock up front, so a
    /// transaction that reads before it writes waits on `busy_timeout` instead of failing
    /// with `SQLITE_BUSY` when it tries to upgrade.
    pub async fn begin(&self) -> Result<SessionTransaction, DatabaseError> {
        let tx = self
            .pool
            .begin_with("BEGIN IMMEDIATE")
            .await
            .map_err(|e| DatabaseError::Transaction(e.to_string()))?;
        Ok(SessionTransaction { tx })
    }

    pub async fn stats(&self) -> Result<SessionStats, DatabaseError> {
        let row = sqlx::query(
            "SELECT total_games, player_wins, computer_wins, ties FROM current_session WHERE id = ?",
        )
        .bind(SESSION_ID)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DatabaseError::Query(e.to_string()))?;

        stats_from_row(&row)
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// One atomic unit of work. Dropping it without committing rolls everything back.
pub struct SessionTransaction {
    tx: Transaction<'static, Sqlite>,
}

impl SessionTransaction {
    pub async fn current_game(&mut self) -> Result<Option<CurrentGame>, DatabaseError> {
        let row = sqlx::query(
            "SELECT id, status, timestamp, player_score, computer_score, winner
             FROM current_game ORDER BY timestamp DESC LIMIT 1",
        )
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| DatabaseError::Query(e.to_string()))?;

        row.as_ref().map(game_from_row).transpose()
    }

    /// Makes `game` the only current game.
    pub async fn replace_current_game(&mut self, game: &CurrentGame) -> Result<(), DatabaseError> {
        sqlx::query("DELETE FROM current_game")
            .execute(&mut *self.tx)
            .await
            .map_err(|e| DatabaseError::Query(e.to_string()))?;

        sqlx::query(
            "INSERT INTO current_game (id, status, timestamp, player_score, computer_score, winner)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(game.id.as_str())
        .bind(game.status.as_str())
        .bind(game.timestamp)
        .bind(game.player_score)
        .bind(game.computer_score)
        .bind(game.winner.map(|w| w.as_str()))
        .execute(&mut *self.tx)
        .await
        .map_err(|e| DatabaseError::Query(e.to_string()))?;

        Ok(())
    }

    /// Stores the completed state of `game` over its started row. Returns `false` when no
    /// started game has this id.
    pub async fn complete_game(&mut self, game: &CurrentGame) -> Result<bool, DatabaseError> {
        let result = sqlx::query(
            "UPDATE current_game
             SET status = ?, player_score = ?, computer_score = ?, winner = ?
             WHERE id = ? AND status = 'started'",
        )
        .bind(game.status.as_str())
        .bind(game.player_score)
        .bind(game.computer_score)
        .bind(game.winner.map(|w| w.as_str()))
        .bind(game.id.as_str())
        .execute(&mut *self.tx)
        .await
        .map_err(|e| DatabaseError::Query(e.to_string()))?;

        Ok(result.rows_affected() == 1)
    }

    pub async fn record_result(&mut self, winner: Winner) -> Result<(), DatabaseError> {
        let mut delta = SessionStats::default();
        delta.record(winner);

        let result = sqlx::query(
            "UPDATE current_session
             SET total_games = total_games + ?,
                 player_wins = player_wins + ?,
                 computer_wins = computer_wins + ?,
                 ties = ties + ?
             WHERE id = ?",
        )
        .bind(delta.total_games)
        .bind(delta.player_wins)
        .bind(delta.computer_wins)
        .bind(delta.ties)
        .bind(SESSION_ID)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| DatabaseError::Query(e.to_string()))?;

        expect_session_row(result.rows_affected())
    }

    pub async fn reset_session(&mut self) -> Result<SessionStats, DatabaseError> {
        let result = sqlx::query(
            "UPDATE current_session
             SET total_games = 0, player_wins = 0, computer_wins = 0, ties = 0
             WHERE id = ?",
        )
        .bind(SESSION_ID)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| DatabaseError::Query(e.to_string()))?;

        expect_session_row(result.rows_affected())?;
        Ok(SessionStats::default())
    }

    pub async fn commit(self) -> Result<(), DatabaseError> {
        self.tx
            .commit()
            .await
            .map_err(|e| DatabaseError::Transaction(e.to_string()))
    }

    pub async fn rollback(self) -> Result<(), DatabaseError> {
        self.tx
            .rollback()
            .await
            .map_err(|e| DatabaseError::Transaction(e.to_string()))
    }
}

fn expect_session_row(rows_affected: u64) -> Result<(), DatabaseError> {
    if rows_affected == 1 {
        Ok(())
    } else {
        Err(DatabaseError::Query(format!(
            "current_session row {SESSION_ID} is missing"
        )))
    }
}

fn game_from_row(row: &SqliteRow) -> Result<CurrentGame, DatabaseError> {
    let get_err = |e: sqlx::Error| DatabaseError::Query(e.to_string());

    let id: String = row.try_get("id").map_err(get_err)?;
    let status: String = row.try_get("status").map_err(get_err)?;
    let winner: Option<String> = row.try_get("winner").map_err(get_err)?;

    Ok(CurrentGame {
        id: GameId::from(id),
        status: status.parse::<GameStatus>()?,
        timestamp: row.try_get("timestamp").map_err(get_err)?,
        player_score: row.try_get("player_score").map_err(get_err)?,
        computer_score: row.try_get("computer_score").map_err(get_err)?,
        winner: winner.as_deref().map(str::parse::<Winner>).transpose()?,
    })
}

fn stats_from_row(row: &SqliteRow) -> Result<SessionStats, DatabaseError> {
    let get_err = |e: sqlx::Error| DatabaseError::Query(e.to_string());

    Ok(SessionStats {
        total_games: row.try_get("total_games").map_err(get_err)?,
        player_wins: row.try_get("player_wins").map_err(get_err)?,
        computer_wins: row.try_get("computer_wins").map_err(get_err)?,
        ties: row.try_get("ties").map_err(get_err)?,
    })
}
