//! HTTP routes for the dice game.
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | POST | `/api/games/start` | Start a new game |
//! | POST | `/api/games/reset` | Zero the session and start a new game |
//! | POST | `/api/games/roll` | Roll the current game |
//! | GET | `/api/games/history` | Last 10 completed games |
//! | GET | `/api/games/stats` | Session tally and player win rate |

use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use game::GameService;
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use types::{GameHistoryRecord, GameId, RollOutcome, SessionStats};

use crate::error::ApiError;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<GameService>,
}

impl AppState {
    pub fn new(service: Arc<GameService>) -> Self {
        Self { service }
    }
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let games = Router::new()
        .route("/start", post(start_game))
        .route("/reset", post(reset_game))
        .route("/roll", post(roll_dice))
        .route("/history", get(history))
        .route("/stats", get(stats));

    Router::new()
        .route("/health", get(health))
        .nest("/api/games", games)
        .layer(cors)
        .with_state(state)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartResponse {
    pub game_id: GameId,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetResponse {
    pub success: bool,
    pub game_id: GameId,
    pub stats: SessionStats,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    #[serde(flatten)]
    pub stats: SessionStats,
    pub player_win_rate: f64,
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "OK" }))
}

async fn start_game(State(state): State<AppState>) -> Result<Json<StartResponse>, ApiError> {
    let game_id = state
        .service
        .start_game()
        .await
        .map_err(ApiError::with("Failed to start game"))?;
    Ok(Json(StartResponse { game_id }))
}

async fn reset_game(State(state): State<AppState>) -> Result<Json<ResetResponse>, ApiError> {
    let reset = state
        .service
        .reset_game()
        .await
        .map_err(ApiError::with("Failed to reset game"))?;
    Ok(Json(ResetResponse {
        success: true,
        game_id: reset.game_id,
        stats: reset.stats,
        message: "Game reset successfully",
    }))
}

async fn roll_dice(State(state): State<AppState>) -> Result<Json<RollOutcome>, ApiError> {
    let outcome = state
        .service
        .roll_dice()
        .await
        .map_err(ApiError::with("Failed to process roll"))?;
    Ok(Json(outcome))
}

async fn history(
    State(state): State<AppState>,
) -> Result<Json<Vec<GameHistoryRecord>>, ApiError> {
    let records = state
        .service
        .history()
        .await
        .map_err(ApiError::with("Failed to fetch game history"))?;
    Ok(Json(records))
}

async fn stats(State(state): State<AppState>) -> Result<Json<StatsResponse>, ApiError> {
    let snapshot = state
        .service
        .stats()
        .await
        .map_err(ApiError::with("Failed to fetch stats"))?;
    Ok(Json(StatsResponse {
        stats: snapshot.stats,
        player_win_rate: snapshot.player_win_rate,
    }))
}
