//! Axum route handlers for the invitation API.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::{Actor, ActorKind};
use crate::errors::AppError;
use crate::invitations::store;
use crate::models::invitation::InvitationRow;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct IssueRequest {
    pub target_email: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct IssueResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// POST /api/v1/invitations
///
/// Coordinator issues a registration code for a prospective company.
/// The full token goes out by email; the response echoes it for the
/// issuing coordinator (the UI truncates it on display).
pub async fn handle_issue(
    State(state): State<AppState>,
    actor: Actor,
    Json(request): Json<IssueRequest>,
) -> Result<Json<IssueResponse>, AppError> {
    actor.require_kind(ActorKind::Coordinator)?;

    let email = request.target_email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::Validation(
            "target_email must be a valid email address".to_string(),
        ));
    }

    let invitation = store::issue(
        &state.db,
        state.mailer.as_ref(),
        actor.id,
        email,
        request.message.trim(),
    )
    .await?;

    Ok(Json(IssueResponse {
        token: invitation.token,
        expires_at: invitation.expires_at,
    }))
}

/// GET /api/v1/invitations
///
/// Lists the coordinator's own invitations with post-sweep statuses.
pub async fn handle_list(
    State(state): State<AppState>,
    actor: Actor,
) -> Result<Json<Vec<InvitationRow>>, AppError> {
    actor.require_kind(ActorKind::Coordinator)?;
    let invitations = store::list_by_issuer(&state.db, actor.id).await?;
    Ok(Json(invitations))
}

/// GET /api/v1/invitations/:token
///
/// Validates a registration code. A non-pending token answers with a
/// structured `INVALID_STATE` reason (`used` | `expired`); an unknown one
/// with `NOT_FOUND`.
pub async fn handle_validate(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<InvitationRow>, AppError> {
    let invitation = store::validate(&state.db, &token).await?;
    Ok(Json(invitation))
}

/// POST /api/v1/invitations/:token/consume
///
/// The newly registered company redeems its code. Exactly one concurrent
/// consumer can ever succeed.
pub async fn handle_consume(
    State(state): State<AppState>,
    actor: Actor,
    Path(token): Path<String>,
) -> Result<Json<InvitationRow>, AppError> {
    actor.require_kind(ActorKind::Company)?;
    let invitation = store::consume(&state.db, &token, actor.id).await?;
    Ok(Json(invitation))
}
