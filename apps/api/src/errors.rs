use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Every variant maps to a stable error code. Retries are the caller's
/// responsibility; all mutating operations use conditional writes and are
/// safe to retry.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// A read or transition hit an entity whose current state forbids it
    /// (e.g. validating a token that is already `used` or `expired`).
    #[error("Invalid state: {reason}")]
    InvalidState { reason: String },

    /// Transition attempted from a terminal application state.
    #[error("Already finalized: {0}")]
    FinalizedState(String),

    /// Lost race on an optimistic conditional update.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Second consumer lost the race on a single-use invitation token.
    #[error("Invitation token already consumed")]
    AlreadyConsumed,

    #[error("Duplicate target: {0}")]
    DuplicateTarget(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden")]
    Forbidden,

    /// Invitation email could not be delivered. Only surfaced from invitation
    /// issuance, where delivery failure rolls back the core write.
    #[error("Email delivery failed: {0}")]
    Email(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::InvalidState { reason } => {
                (StatusCode::BAD_REQUEST, "INVALID_STATE", reason.clone())
            }
            AppError::FinalizedState(msg) => (StatusCode::CONFLICT, "FINALIZED_STATE", msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            AppError::AlreadyConsumed => (
                StatusCode::CONFLICT,
                "ALREADY_CONSUMED",
                "Invitation token already consumed".to_string(),
            ),
            AppError::DuplicateTarget(msg) => {
                (StatusCode::BAD_REQUEST, "DUPLICATE_TARGET", msg.clone())
            }
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Authentication required".to_string(),
            ),
            AppError::Forbidden => (
                StatusCode::FORBIDDEN,
                "FORBIDDEN",
                "Access denied".to_string(),
            ),
            AppError::Email(msg) => {
                tracing::error!("Email delivery error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "EMAIL_ERROR",
                    "Invitation email could not be delivered".to_string(),
                )
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_maps_to_409() {
        let resp = AppError::Conflict("application already decided".to_string()).into_response();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_already_consumed_maps_to_409() {
        let resp = AppError::AlreadyConsumed.into_response();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_invalid_state_maps_to_400() {
        let resp = AppError::InvalidState {
            reason: "expired".to_string(),
        }
        .into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_finalized_state_maps_to_409() {
        let resp = AppError::FinalizedState("application is hired".to_string()).into_response();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_forbidden_maps_to_403() {
        let resp = AppError::Forbidden.into_response();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }
}
