use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use database::{
    in_memory_session_store, DatabaseError, HistoryStore, MemoryHistoryStore, RetryPolicy,
};
use game::GameService;
use rollers::FixedRoller;
use serde_json::{json, Value};
use server::{build_router, AppState};
use tower::ServiceExt;
use types::GameHistoryRecord;

/// History store that is always down.
struct UnreachableHistory;

#[async_trait]
impl HistoryStore for UnreachableHistory {
    async fn append(&self, _record: &GameHistoryRecord) -> Result<(), DatabaseError> {
        Err(DatabaseError::Document("connection refused".to_string()))
    }

    async fn recent(&self, _limit: usize) -> Result<Vec<GameHistoryRecord>, DatabaseError> {
        Err(DatabaseError::Document("connection refused".to_string()))
    }
}

/// The router plus a handle on its service, for waiting on background history writes.
struct TestApp {
    router: axum::Router,
    service: Arc<GameService>,
}

async fn app_with(history: Arc<dyn HistoryStore>, faces: &[u8]) -> TestApp {
    let sessions = in_memory_session_store()
        .await
        .expect("Failed to create session store");
    let service = GameService::new(sessions, history)
        .with_roller(Arc::new(FixedRoller::new(faces.iter().copied())))
        .with_history_retry(RetryPolicy::no_retry());
    let service = Arc::new(service);
    TestApp {
        router: build_router(AppState::new(Arc::clone(&service))),
        service,
    }
}

async fn app(faces: &[u8]) -> TestApp {
    app_with(Arc::new(MemoryHistoryStore::new()), faces).await
}

/// Send a request to the app and return (status, JSON body).
async fn send(app: &TestApp, method: Method, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    let resp = app.router.clone().oneshot(request).await.unwrap();
    let status = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn health_reports_ok() {
    let app = app(&[1]).await;
    let (status, body) = send(&app, Method::GET, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "OK" }));
}

#[tokio::test]
async fn start_returns_game_id() {
    let app = app(&[1]).await;
    let (status, body) = send(&app, Method::POST, "/api/games/start").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["gameId"].as_str().is_some_and(|id| !id.is_empty()));
}

#[tokio::test]
async fn roll_without_start_is_404() {
    let app = app(&[1]).await;
    let (status, body) = send(&app, Method::POST, "/api/games/roll").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "No active game found" }));

    let (_, stats) = send(&app, Method::GET, "/api/games/stats").await;
    assert_eq!(stats["totalGames"], 0);
}

#[tokio::test]
async fn reset_without_game_is_404() {
    let app = app(&[1]).await;
    let (status, body) = send(&app, Method::POST, "/api/games/reset").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "No active game found");
}

#[tokio::test]
async fn start_roll_stats_history_flow() {
    let app = app(&[6, 6, 1, 1]).await;

    let (_, started) = send(&app, Method::POST, "/api/games/start").await;
    let game_id = started["gameId"].as_str().unwrap().to_string();

    let (status, roll) = send(&app, Method::POST, "/api/games/roll").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        roll,
        json!({
            "playerDice": [6, 6],
            "computerDice": [1, 1],
            "winner": "player",
            "playerTotal": 12,
            "computerTotal": 2,
        })
    );

    let (status, stats) = send(&app, Method::GET, "/api/games/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        stats,
        json!({
            "totalGames": 1,
            "playerWins": 1,
            "computerWins": 0,
            "ties": 0,
            "playerWinRate": 100.0,
        })
    );

    app.service.flush_history().await;
    let (status, history) = send(&app, Method::GET, "/api/games/history").await;
    assert_eq!(status, StatusCode::OK);
    let records = history.as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["id"], game_id.as_str());
    assert_eq!(records[0]["winner"], "player");
    assert_eq!(records[0]["playerScore"], 12);
    assert_eq!(records[0]["computerScore"], 2);
    assert_eq!(records[0]["playerDice"], json!([6, 6]));
    assert_eq!(records[0]["computerDice"], json!([1, 1]));
    assert!(records[0]["timestamp"].is_string());
}

#[tokio::test]
async fn second_roll_is_409() {
    let app = app(&[3, 3, 3, 3]).await;
    send(&app, Method::POST, "/api/games/start").await;
    let (status, roll) = send(&app, Method::POST, "/api/games/roll").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(roll["winner"], "tie");

    let (status, body) = send(&app, Method::POST, "/api/games/roll").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].is_string());

    let (_, stats) = send(&app, Method::GET, "/api/games/stats").await;
    assert_eq!(stats["totalGames"], 1);
    assert_eq!(stats["ties"], 1);
}

#[tokio::test]
async fn reset_zeroes_stats() {
    let app = app(&[2, 2, 6, 6]).await;
    send(&app, Method::POST, "/api/games/start").await;
    send(&app, Method::POST, "/api/games/roll").await;

    let (status, body) = send(&app, Method::POST, "/api/games/reset").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Game reset successfully");
    assert!(body["gameId"].is_string());
    assert_eq!(
        body["stats"],
        json!({ "totalGames": 0, "playerWins": 0, "computerWins": 0, "ties": 0 })
    );

    let (_, stats) = send(&app, Method::GET, "/api/games/stats").await;
    assert_eq!(stats["totalGames"], 0);
    assert_eq!(stats["playerWinRate"], 0.0);
}

#[tokio::test]
async fn history_is_capped_at_ten_newest_first() {
    let app = app(&[5, 4, 3, 1]).await;
    for _ in 0..12 {
        send(&app, Method::POST, "/api/games/start").await;
        let (status, _) = send(&app, Method::POST, "/api/games/roll").await;
        assert_eq!(status, StatusCode::OK);
    }

    app.service.flush_history().await;
    let (_, history) = send(&app, Method::GET, "/api/games/history").await;
    let records = history.as_array().unwrap();
    assert_eq!(records.len(), 10);
    let timestamps: Vec<&str> = records
        .iter()
        .map(|r| r["timestamp"].as_str().unwrap())
        .collect();
    let parsed: Vec<chrono::DateTime<chrono::Utc>> = timestamps
        .iter()
        .map(|t| t.parse().unwrap())
        .collect();
    assert!(parsed.windows(2).all(|w| w[0] >= w[1]));
}

#[tokio::test]
async fn history_store_outage_hides_details() {
    let app = app_with(Arc::new(UnreachableHistory), &[6, 5, 4, 3]).await;

    send(&app, Method::POST, "/api/games/start").await;
    let (status, roll) = send(&app, Method::POST, "/api/games/roll").await;
    assert_eq!(status, StatusCode::OK, "roll is committed despite the outage");
    assert_eq!(roll["winner"], "player");

    let (status, body) = send(&app, Method::GET, "/api/games/history").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Failed to fetch game history" }));
}

#[tokio::test]
async fn cors_headers_are_present() {
    let app = app(&[1]).await;
    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/games/stats")
        .header("origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let resp = app.router.oneshot(request).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
}
