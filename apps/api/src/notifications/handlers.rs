//! Axum route handlers for the notification feed.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::auth::Actor;
use crate::errors::AppError;
use crate::models::notification::NotificationRow;
use crate::notifications;
use crate::state::AppState;

/// GET /api/v1/notifications
pub async fn handle_list(
    State(state): State<AppState>,
    actor: Actor,
) -> Result<Json<Vec<NotificationRow>>, AppError> {
    let feed = notifications::list_for_user(&state.db, actor.id).await?;
    Ok(Json(feed))
}

/// POST /api/v1/notifications/:id/read
pub async fn handle_mark_read(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    notifications::mark_read(&state.db, actor.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
