//! Axum route handlers for the rating API.
//!
//! One polymorphic endpoint pair covers every ratee kind; the kind rides in
//! the body (submit) or the path (read).

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::auth::Actor;
use crate::errors::AppError;
use crate::models::rating::{RateeKind, RatingAggregate, RatingRow};
use crate::ratings::ledger;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SubmitRatingRequest {
    pub ratee_id: i64,
    pub ratee_type: RateeKind,
    pub context: Option<String>,
    pub job_id: Option<i64>,
    pub value: i16,
    pub review: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct RatingDetailResponse {
    pub average: f64,
    pub count: i64,
    pub history: Vec<RatingRow>,
}

/// POST /api/v1/ratings
///
/// Submits or replaces the actor's rating for an entity and returns the
/// freshly recomputed aggregate.
pub async fn handle_submit(
    State(state): State<AppState>,
    actor: Actor,
    Json(request): Json<SubmitRatingRequest>,
) -> Result<Json<RatingAggregate>, AppError> {
    let aggregate = ledger::submit(
        &state.db,
        ledger::RatingSubmission {
            rater_id: actor.id,
            rater_type: actor.kind,
            ratee_id: request.ratee_id,
            ratee_type: request.ratee_type,
            context: request.context,
            job_id: request.job_id,
            value: request.value,
            review: request.review,
        },
    )
    .await?;

    Ok(Json(aggregate))
}

/// GET /api/v1/ratings/:ratee_type/:ratee_id
///
/// Aggregate plus paginated history for one ratee. Unrated entities answer
/// `{average: 0, count: 0, history: []}`.
pub async fn handle_detail(
    State(state): State<AppState>,
    Path((ratee_type, ratee_id)): Path<(RateeKind, i64)>,
    Query(params): Query<HistoryQuery>,
) -> Result<Json<RatingDetailResponse>, AppError> {
    let aggregate = ledger::aggregate_for(&state.db, ratee_id, ratee_type).await?;
    let history = ledger::history(
        &state.db,
        ratee_id,
        ratee_type,
        params.limit.unwrap_or(ledger::DEFAULT_HISTORY_LIMIT),
        params.offset.unwrap_or(0),
    )
    .await?;

    Ok(Json(RatingDetailResponse {
        average: aggregate.average,
        count: aggregate.count,
        history,
    }))
}
