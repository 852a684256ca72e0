//! Axum route handlers for the application lifecycle API.
//!
//! Handlers stay thin: parse, then delegate to the orchestrator. Every
//! decision endpoint answers with the updated application row.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::applications::lifecycle::{validate_interview, InterviewRequest};
use crate::applications::orchestrator;
use crate::auth::Actor;
use crate::errors::AppError;
use crate::models::application::{ApplicationRow, ApplicationStatus};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RejectRequest {
    pub reason: String,
}

#[derive(Debug, Deserialize)]
pub struct HireRequest {
    pub hired_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Pre-screen filter: `qualified` or `pending_review`.
    pub screen: Option<ApplicationStatus>,
}

/// POST /api/v1/jobs/:job_id/applications
///
/// Applicant submits an application against an active job.
pub async fn handle_apply(
    State(state): State<AppState>,
    actor: Actor,
    Path(job_id): Path<i64>,
) -> Result<Json<ApplicationRow>, AppError> {
    let application = orchestrator::apply(&state, actor, job_id).await?;
    Ok(Json(application))
}

/// GET /api/v1/jobs/:job_id/applications
pub async fn handle_list(
    State(state): State<AppState>,
    actor: Actor,
    Path(job_id): Path<i64>,
    Query(params): Query<ListQuery>,
) -> Result<Json<Vec<ApplicationRow>>, AppError> {
    let applications =
        orchestrator::list_for_job(&state.db, actor, job_id, params.screen).await?;
    Ok(Json(applications))
}

/// GET /api/v1/applications/:id
pub async fn handle_get(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
) -> Result<Json<ApplicationRow>, AppError> {
    let application = orchestrator::get(&state.db, actor, id).await?;
    Ok(Json(application))
}

/// POST /api/v1/applications/:id/accept
///
/// Acceptance is interview scheduling: the payload must carry a date, a
/// mode, and the matching location or link.
pub async fn handle_accept(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
    Json(request): Json<InterviewRequest>,
) -> Result<Json<ApplicationRow>, AppError> {
    let plan = validate_interview(request)?;
    let application = orchestrator::accept(&state, actor, id, plan).await?;
    Ok(Json(application))
}

/// POST /api/v1/applications/:id/reject
pub async fn handle_reject(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
    Json(request): Json<RejectRequest>,
) -> Result<Json<ApplicationRow>, AppError> {
    let application = orchestrator::reject(&state, actor, id, &request.reason).await?;
    Ok(Json(application))
}

/// POST /api/v1/applications/:id/interview/complete
pub async fn handle_complete_interview(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
) -> Result<Json<ApplicationRow>, AppError> {
    let application = orchestrator::complete_interview(&state, actor, id).await?;
    Ok(Json(application))
}

/// POST /api/v1/applications/:id/interview/no-show
pub async fn handle_no_show(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
) -> Result<Json<ApplicationRow>, AppError> {
    let application = orchestrator::mark_no_show(&state, actor, id).await?;
    Ok(Json(application))
}

/// POST /api/v1/applications/:id/hire
///
/// The body is optional; `hired_date` defaults to today.
pub async fn handle_hire(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
    request: Option<Json<HireRequest>>,
) -> Result<Json<ApplicationRow>, AppError> {
    let hired_date = request.and_then(|Json(r)| r.hired_date);
    let application = orchestrator::hire(&state, actor, id, hired_date).await?;
    Ok(Json(application))
}

/// POST /api/v1/applications/:id/post-interview-reject
pub async fn handle_post_interview_reject(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
    Json(request): Json<RejectRequest>,
) -> Result<Json<ApplicationRow>, AppError> {
    let application =
        orchestrator::reject_after_interview(&state, actor, id, &request.reason).await?;
    Ok(Json(application))
}
