use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::auth::ActorKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "employment_status", rename_all = "snake_case")]
pub enum EmploymentStatus {
    Active,
    ContractEnded,
}

/// Durable record created exactly once when an application is hired.
/// `application_id` is unique; a second hire attempt fails at the state
/// machine before it could ever reach this table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EmploymentRecordRow {
    pub id: i64,
    pub application_id: i64,
    pub job_id: i64,
    pub employer_type: ActorKind,
    pub employer_id: i64,
    pub applicant_id: i64,
    pub hired_date: NaiveDate,
    pub status: EmploymentStatus,
    pub contract_end_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}
