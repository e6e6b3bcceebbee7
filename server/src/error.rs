use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use game::GameError;

/// A failed game operation, with the generic message shown for internal failures.
#[derive(Debug)]
pub struct ApiError {
    error: GameError,
    message: &'static str,
}

impl ApiError {
    /// For `map_err`: `service.roll_dice().await.map_err(ApiError::with("Failed to process roll"))`.
    pub fn with(message: &'static str) -> impl FnOnce(GameError) -> Self {
        move |error| Self { error, message }
    }

    pub fn status(&self) -> StatusCode {
        match self.error {
            GameError::NotFound => StatusCode::NOT_FOUND,
            GameError::AlreadyCompleted(_) => StatusCode::CONFLICT,
            GameError::TransactionAborted(_) | GameError::Storage(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self.error {
            GameError::NotFound => "No active game found",
            GameError::AlreadyCompleted(_) => "Game already completed; start a new game",
            internal => {
                log::error!("{}: {internal}", self.message);
                self.message
            }
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use database::DatabaseError;
    use types::GameId;

    #[test]
    fn test_status_mapping() {
        let not_found = ApiError::with("x")(GameError::NotFound);
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);

        let completed = ApiError::with("x")(GameError::AlreadyCompleted(GameId::from("g")));
        assert_eq!(completed.status(), StatusCode::CONFLICT);

        let storage = ApiError::with("x")(GameError::Storage(DatabaseError::Query(
            "disk I/O error".to_string(),
        )));
        assert_eq!(storage.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let aborted = ApiError::with("x")(GameError::TransactionAborted("raced".to_string()));
        assert_eq!(aborted.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
