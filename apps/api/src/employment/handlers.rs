//! Axum route handlers for employment records.

use axum::{
    extract::{Path, State},
    Json,
};

use crate::auth::{Actor, ActorKind};
use crate::employment;
use crate::errors::AppError;
use crate::models::employment::EmploymentRecordRow;
use crate::state::AppState;

/// GET /api/v1/employment
pub async fn handle_list(
    State(state): State<AppState>,
    actor: Actor,
) -> Result<Json<Vec<EmploymentRecordRow>>, AppError> {
    actor.require_kind(ActorKind::User)?;
    let records = employment::list_for_applicant(&state.db, actor.id).await?;
    Ok(Json(records))
}

/// POST /api/v1/employment/:id/end
pub async fn handle_end_contract(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
) -> Result<Json<EmploymentRecordRow>, AppError> {
    let record = employment::end_contract(&state.db, actor, id).await?;
    Ok(Json(record))
}
