//! The engagement orchestrator: authorize → validate → transition → notify.
//!
//! Every decision follows the same shape: resolve the application and its
//! owning job, check ownership, resolve the target status against the
//! transition table, then apply an optimistic conditional UPDATE
//! (`WHERE status = <expected>`). Of two concurrent decisions exactly one
//! commits; the loser surfaces `Conflict`. Notifications are recorded after
//! commit and never fail the operation. Hire additionally creates the
//! employment record inside the same transaction as the status flip.
//!
//! Authorization is a strict read/rate vs. write/decide split: a coordinator
//! affiliated with a company may view that company's applications and rate,
//! but only the job's one owner may decide.

use chrono::{NaiveDate, Utc};
use sqlx::PgPool;
use tracing::{info, warn};

use crate::applications::lifecycle::{self, Decision, InterviewPlan};
use crate::auth::{Actor, ActorKind};
use crate::errors::AppError;
use crate::models::application::{ApplicationRow, ApplicationStatus, InterviewStatus};
use crate::models::job::JobRow;
use crate::models::notification::NotificationKind;
use crate::notifications;
use crate::state::AppState;

pub async fn load_application(pool: &PgPool, id: i64) -> Result<ApplicationRow, AppError> {
    let application: Option<ApplicationRow> =
        sqlx::query_as("SELECT * FROM job_applications WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
    application.ok_or_else(|| AppError::NotFound(format!("Application {id} not found")))
}

pub async fn load_job(pool: &PgPool, id: i64) -> Result<JobRow, AppError> {
    let job: Option<JobRow> = sqlx::query_as(
        "SELECT id, title, created_by_type, created_by_id, status, created_at FROM jobs WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    job.ok_or_else(|| AppError::NotFound(format!("Job {id} not found")))
}

/// Affiliation produced by a consumed invitation: grants read/rate on the
/// company's jobs, never write/decide.
pub async fn is_affiliated_coordinator(
    pool: &PgPool,
    coordinator_id: i64,
    company_id: i64,
) -> Result<bool, AppError> {
    Ok(sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM company_coordinators WHERE coordinator_id = $1 AND company_id = $2)",
    )
    .bind(coordinator_id)
    .bind(company_id)
    .fetch_one(pool)
    .await?)
}

/// View access: the job's owner, the applicant themselves, or a coordinator
/// affiliated with the owning company.
pub async fn ensure_can_view(
    pool: &PgPool,
    actor: Actor,
    application: &ApplicationRow,
    job: &JobRow,
) -> Result<(), AppError> {
    if job.is_owned_by(actor.kind, actor.id) {
        return Ok(());
    }
    if actor.kind == ActorKind::User && actor.id == application.applicant_id {
        return Ok(());
    }
    if actor.kind == ActorKind::Coordinator
        && job.created_by_type == ActorKind::Company
        && is_affiliated_coordinator(pool, actor.id, job.created_by_id).await?
    {
        return Ok(());
    }
    Err(AppError::Forbidden)
}

/// Loads, authorizes, and resolves the target status for a decision.
async fn prepare_decision(
    pool: &PgPool,
    actor: Actor,
    application_id: i64,
    decision: Decision,
) -> Result<(ApplicationRow, JobRow, ApplicationStatus), AppError> {
    let application = load_application(pool, application_id).await?;
    let job = load_job(pool, application.job_id).await?;

    if !job.is_owned_by(actor.kind, actor.id) {
        return Err(AppError::Forbidden);
    }

    let next = lifecycle::next_status(application.status, decision)?;
    Ok((application, job, next))
}

fn lost_race() -> AppError {
    AppError::Conflict("application already decided".to_string())
}

/// An applicant submits an application. One per applicant per job.
pub async fn apply(state: &AppState, actor: Actor, job_id: i64) -> Result<ApplicationRow, AppError> {
    actor.require_kind(ActorKind::User)?;
    let job = load_job(&state.db, job_id).await?;
    if job.status != "active" {
        return Err(AppError::Validation(format!(
            "job {job_id} is not accepting applications"
        )));
    }

    let inserted = sqlx::query_as::<_, ApplicationRow>(
        r#"
        INSERT INTO job_applications (job_id, applicant_id, status)
        VALUES ($1, $2, 'pending')
        RETURNING *
        "#,
    )
    .bind(job_id)
    .bind(actor.id)
    .fetch_one(&state.db)
    .await;

    match inserted {
        Ok(application) => {
            info!(
                "Application {} submitted by user {} for job {job_id}",
                application.id, actor.id
            );
            Ok(application)
        }
        Err(sqlx::Error::Database(db)) if db.is_unique_violation() => Err(AppError::Conflict(
            "you have already applied to this job".to_string(),
        )),
        Err(e) => Err(e.into()),
    }
}

/// Accept = schedule the interview. There is no separate acceptance step.
pub async fn accept(
    state: &AppState,
    actor: Actor,
    application_id: i64,
    plan: InterviewPlan,
) -> Result<ApplicationRow, AppError> {
    let (application, job, next) =
        prepare_decision(&state.db, actor, application_id, Decision::Accept).await?;

    let updated: Option<ApplicationRow> = sqlx::query_as(
        r#"
        UPDATE job_applications
        SET status = $3,
            interview_date = $4,
            interview_mode = $5,
            interview_location = $6,
            interview_link = $7,
            interview_notes = $8,
            interview_status = 'scheduled',
            updated_at = now()
        WHERE id = $1 AND status = $2
        RETURNING *
        "#,
    )
    .bind(application.id)
    .bind(application.status)
    .bind(next)
    .bind(plan.date)
    .bind(plan.mode)
    .bind(&plan.location)
    .bind(&plan.link)
    .bind(&plan.notes)
    .fetch_optional(&state.db)
    .await?;
    let updated = updated.ok_or_else(lost_race)?;

    let place = plan
        .location
        .or(plan.link)
        .unwrap_or_default();
    notifications::create_or_log(
        &state.db,
        updated.applicant_id,
        "Interview scheduled",
        &format!(
            "Your application for \"{}\" moved to interview: {} at {place}",
            job.title, plan.date
        ),
        NotificationKind::ApplicationStatus,
        Some(updated.id),
        None,
    )
    .await;
    notifications::create_or_log(
        &state.db,
        updated.applicant_id,
        "Upcoming interview",
        &format!("Interview for \"{}\" at {}", job.title, plan.date),
        NotificationKind::InterviewReminder,
        Some(updated.id),
        Some(plan.date),
    )
    .await;

    Ok(updated)
}

/// Pre-interview rejection. Terminal.
pub async fn reject(
    state: &AppState,
    actor: Actor,
    application_id: i64,
    reason: &str,
) -> Result<ApplicationRow, AppError> {
    decide_reject(state, actor, application_id, reason, Decision::Reject).await
}

/// Rejection after a completed interview. Terminal.
pub async fn reject_after_interview(
    state: &AppState,
    actor: Actor,
    application_id: i64,
    reason: &str,
) -> Result<ApplicationRow, AppError> {
    decide_reject(
        state,
        actor,
        application_id,
        reason,
        Decision::RejectAfterInterview,
    )
    .await
}

async fn decide_reject(
    state: &AppState,
    actor: Actor,
    application_id: i64,
    reason: &str,
    decision: Decision,
) -> Result<ApplicationRow, AppError> {
    let reason = reason.trim();
    if reason.is_empty() {
        return Err(AppError::Validation(
            "a rejection reason is required".to_string(),
        ));
    }

    let (application, job, next) =
        prepare_decision(&state.db, actor, application_id, decision).await?;

    let updated: Option<ApplicationRow> = sqlx::query_as(
        r#"
        UPDATE job_applications
        SET status = $3, rejection_reason = $4, updated_at = now()
        WHERE id = $1 AND status = $2
        RETURNING *
        "#,
    )
    .bind(application.id)
    .bind(application.status)
    .bind(next)
    .bind(reason)
    .fetch_optional(&state.db)
    .await?;
    let updated = updated.ok_or_else(lost_race)?;

    notifications::create_or_log(
        &state.db,
        updated.applicant_id,
        "Application update",
        &format!("Your application for \"{}\" was not successful.", job.title),
        NotificationKind::ApplicationStatus,
        Some(updated.id),
        None,
    )
    .await;

    // Fire-and-forget rejection email; delivery failure is non-fatal here.
    let applicant_email: Option<String> = sqlx::query_scalar("SELECT email FROM users WHERE id = $1")
        .bind(updated.applicant_id)
        .fetch_optional(&state.db)
        .await?;
    if let Some(email) = applicant_email {
        if let Err(e) = state
            .mailer
            .send(
                &email,
                &format!("Update on your application for \"{}\"", job.title),
                reason,
            )
            .await
        {
            warn!("Failed to send rejection email to {email}: {e}");
        }
    }

    Ok(updated)
}

/// Marks a scheduled interview completed.
pub async fn complete_interview(
    state: &AppState,
    actor: Actor,
    application_id: i64,
) -> Result<ApplicationRow, AppError> {
    finish_interview(state, actor, application_id, Decision::CompleteInterview).await
}

/// Marks a scheduled interview as a no-show. The application still lands on
/// `interview_completed`; only the embedded interview status differs.
pub async fn mark_no_show(
    state: &AppState,
    actor: Actor,
    application_id: i64,
) -> Result<ApplicationRow, AppError> {
    finish_interview(state, actor, application_id, Decision::MarkNoShow).await
}

async fn finish_interview(
    state: &AppState,
    actor: Actor,
    application_id: i64,
    decision: Decision,
) -> Result<ApplicationRow, AppError> {
    let (application, job, next) =
        prepare_decision(&state.db, actor, application_id, decision).await?;

    let interview_status = match decision {
        Decision::MarkNoShow => InterviewStatus::NoShow,
        _ => InterviewStatus::Completed,
    };

    let updated: Option<ApplicationRow> = sqlx::query_as(
        r#"
        UPDATE job_applications
        SET status = $3, interview_status = $4, updated_at = now()
        WHERE id = $1 AND status = $2
        RETURNING *
        "#,
    )
    .bind(application.id)
    .bind(application.status)
    .bind(next)
    .bind(interview_status)
    .fetch_optional(&state.db)
    .await?;
    let updated = updated.ok_or_else(lost_race)?;

    let message = match decision {
        Decision::MarkNoShow => format!(
            "You were marked absent for the \"{}\" interview.",
            job.title
        ),
        _ => format!("Your interview for \"{}\" is completed.", job.title),
    };
    notifications::create_or_log(
        &state.db,
        updated.applicant_id,
        "Interview update",
        &message,
        NotificationKind::ApplicationStatus,
        Some(updated.id),
        None,
    )
    .await;

    Ok(updated)
}

/// Hires the applicant. The status flip and the employment record are one
/// transaction: an application never reaches `hired` without exactly one
/// record, and never twice (a repeat hire dies in the state machine first).
pub async fn hire(
    state: &AppState,
    actor: Actor,
    application_id: i64,
    hired_date: Option<NaiveDate>,
) -> Result<ApplicationRow, AppError> {
    let (application, job, next) =
        prepare_decision(&state.db, actor, application_id, Decision::Hire).await?;
    let hired_date = hired_date.unwrap_or_else(|| Utc::now().date_naive());

    let mut tx = state.db.begin().await?;

    let updated: Option<ApplicationRow> = sqlx::query_as(
        r#"
        UPDATE job_applications
        SET status = $3, updated_at = now()
        WHERE id = $1 AND status = $2
        RETURNING *
        "#,
    )
    .bind(application.id)
    .bind(application.status)
    .bind(next)
    .fetch_optional(&mut *tx)
    .await?;
    let updated = updated.ok_or_else(lost_race)?;

    sqlx::query(
        r#"
        INSERT INTO employment_records
            (application_id, job_id, employer_type, employer_id, applicant_id, hired_date, status)
        VALUES ($1, $2, $3, $4, $5, $6, 'active')
        "#,
    )
    .bind(updated.id)
    .bind(job.id)
    .bind(job.created_by_type)
    .bind(job.created_by_id)
    .bind(updated.applicant_id)
    .bind(hired_date)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    info!(
        "Application {} hired by {} {} (job {})",
        updated.id,
        job.created_by_type.as_str(),
        job.created_by_id,
        job.id
    );

    notifications::create_or_log(
        &state.db,
        updated.applicant_id,
        "You have been hired",
        &format!("Congratulations, you were hired for \"{}\".", job.title),
        NotificationKind::ApplicationStatus,
        Some(updated.id),
        None,
    )
    .await;

    Ok(updated)
}

/// Applications for a job, visible to the owner or an affiliated
/// coordinator. `screen` narrows to one pre-screen status: a query-time
/// filter, never a transition.
pub async fn list_for_job(
    pool: &PgPool,
    actor: Actor,
    job_id: i64,
    screen: Option<ApplicationStatus>,
) -> Result<Vec<ApplicationRow>, AppError> {
    let job = load_job(pool, job_id).await?;

    let allowed = job.is_owned_by(actor.kind, actor.id)
        || (actor.kind == ActorKind::Coordinator
            && job.created_by_type == ActorKind::Company
            && is_affiliated_coordinator(pool, actor.id, job.created_by_id).await?);
    if !allowed {
        return Err(AppError::Forbidden);
    }

    if let Some(status) = screen {
        if !matches!(
            status,
            ApplicationStatus::Qualified | ApplicationStatus::PendingReview
        ) {
            return Err(AppError::Validation(
                "screen must be qualified or pending_review".to_string(),
            ));
        }
        Ok(sqlx::query_as(
            "SELECT * FROM job_applications WHERE job_id = $1 AND status = $2 ORDER BY created_at DESC",
        )
        .bind(job_id)
        .bind(status)
        .fetch_all(pool)
        .await?)
    } else {
        Ok(sqlx::query_as(
            "SELECT * FROM job_applications WHERE job_id = $1 ORDER BY created_at DESC",
        )
        .bind(job_id)
        .fetch_all(pool)
        .await?)
    }
}

/// A single application, for anyone with view access.
pub async fn get(pool: &PgPool, actor: Actor, application_id: i64) -> Result<ApplicationRow, AppError> {
    let application = load_application(pool, application_id).await?;
    let job = load_job(pool, application.job_id).await?;
    ensure_can_view(pool, actor, &application, &job).await?;
    Ok(application)
}
