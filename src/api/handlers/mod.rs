mod advantages;
mod checkpoints;
mod draft;
mod evolution;
mod league;
mod weekly;

pub use advantages::*;
pub use checkpoints::*;
pub use draft::*;
pub use evolution::*;
pub use league::*;
pub use weekly::*;

use axum::{http::StatusCode, response::IntoResponse, Json};

use super::types::ErrorBody;
use crate::LeagueError;

// ============================================================
// Error Handling
// ============================================================

pub type ApiError = (StatusCode, Json<ErrorBody>);
pub type ApiResult<T> = Result<Json<T>, ApiError>;
pub type Created<T> = Result<(StatusCode, Json<T>), ApiError>;

/// HTTP status for an engine error.
pub fn status_for(e: &LeagueError) -> StatusCode {
    match e {
        LeagueError::NotFound { .. } => StatusCode::NOT_FOUND,
        LeagueError::Unauthorized(_) => StatusCode::FORBIDDEN,
        LeagueError::InvalidPhase(_)
        | LeagueError::NotForward { .. }
        | LeagueError::InvalidTransition(_)
        | LeagueError::WrongTurn(_)
        | LeagueError::PromptUnavailable(_)
        | LeagueError::AlreadyExists(_)
        | LeagueError::DuplicateArtist(_) => StatusCode::CONFLICT,
        LeagueError::CapacityExceeded(_) => StatusCode::UNPROCESSABLE_ENTITY,
        LeagueError::Storage(_) | LeagueError::Serialization(_) | LeagueError::LockPoisoned => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Convert an engine error into a response. Infrastructure failures are
/// logged in full and reported to the client without detail.
pub fn league_error(e: LeagueError) -> ApiError {
    let status = status_for(&e);
    let message = if e.is_internal() {
        tracing::error!("Internal error: {}", e);
        "Internal server error".to_string()
    } else {
        tracing::debug!("Rejected request: {}", e);
        e.to_string()
    };
    (
        status,
        Json(ErrorBody {
            error: e.kind().to_string(),
            message,
        }),
    )
}

fn created<T>(value: T) -> (StatusCode, Json<T>) {
    (StatusCode::CREATED, Json(value))
}

// ============================================================
// Health
// ============================================================

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_map_to_client_statuses() {
        assert_eq!(status_for(&LeagueError::not_found("season", "x")), StatusCode::NOT_FOUND);
        assert_eq!(status_for(&LeagueError::Unauthorized("no".into())), StatusCode::FORBIDDEN);
        assert_eq!(status_for(&LeagueError::WrongTurn("no".into())), StatusCode::CONFLICT);
        assert_eq!(
            status_for(&LeagueError::CapacityExceeded("no".into())),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn internal_errors_are_sanitized() {
        let (status, Json(body)) = league_error(LeagueError::LockPoisoned);
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error, "internal");
        assert_eq!(body.message, "Internal server error");
    }
}
