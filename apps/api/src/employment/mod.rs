//! Employment records: created by the hire transition, ended by the
//! employed applicant.

use sqlx::PgPool;
use tracing::info;

use crate::auth::{Actor, ActorKind};
use crate::errors::AppError;
use crate::models::employment::{EmploymentRecordRow, EmploymentStatus};

pub mod handlers;

/// The applicant's own employment records, newest first.
pub async fn list_for_applicant(
    pool: &PgPool,
    applicant_id: i64,
) -> Result<Vec<EmploymentRecordRow>, AppError> {
    Ok(sqlx::query_as(
        "SELECT * FROM employment_records WHERE applicant_id = $1 ORDER BY hired_date DESC",
    )
    .bind(applicant_id)
    .fetch_all(pool)
    .await?)
}

/// Ends an active contract. Only the employed applicant may flip their own
/// record; the flip is a conditional write so a repeat call conflicts
/// instead of rewriting the end date.
pub async fn end_contract(
    pool: &PgPool,
    actor: Actor,
    record_id: i64,
) -> Result<EmploymentRecordRow, AppError> {
    actor.require_kind(ActorKind::User)?;

    let record: Option<EmploymentRecordRow> =
        sqlx::query_as("SELECT * FROM employment_records WHERE id = $1")
            .bind(record_id)
            .fetch_optional(pool)
            .await?;
    let record = record
        .ok_or_else(|| AppError::NotFound(format!("Employment record {record_id} not found")))?;

    if record.applicant_id != actor.id {
        return Err(AppError::Forbidden);
    }

    let updated: Option<EmploymentRecordRow> = sqlx::query_as(
        r#"
        UPDATE employment_records
        SET status = $2, contract_end_date = CURRENT_DATE
        WHERE id = $1 AND status = 'active'
        RETURNING *
        "#,
    )
    .bind(record_id)
    .bind(EmploymentStatus::ContractEnded)
    .fetch_optional(pool)
    .await?;

    let updated =
        updated.ok_or_else(|| AppError::Conflict("contract already ended".to_string()))?;
    info!("Employment record {record_id} marked contract_ended");
    Ok(updated)
}
