use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Status of a job application. The allowed transitions live in
/// `applications::lifecycle`; nothing else may decide what follows what.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "application_status", rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    Qualified,
    PendingReview,
    InterviewScheduled,
    InterviewCompleted,
    Accepted,
    Rejected,
    Hired,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Qualified => "qualified",
            ApplicationStatus::PendingReview => "pending_review",
            ApplicationStatus::InterviewScheduled => "interview_scheduled",
            ApplicationStatus::InterviewCompleted => "interview_completed",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Hired => "hired",
        }
    }

    /// Terminal states admit no further decision.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ApplicationStatus::Rejected | ApplicationStatus::Hired)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "interview_mode", rename_all = "snake_case")]
pub enum InterviewMode {
    Onsite,
    Online,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "interview_status", rename_all = "snake_case")]
pub enum InterviewStatus {
    Scheduled,
    Completed,
    Cancelled,
    NoShow,
}

/// A job application row. Interview columns are populated iff the application
/// has ever reached `interview_scheduled`; mode decides which of
/// location/link is set, never both.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ApplicationRow {
    pub id: i64,
    pub job_id: i64,
    pub applicant_id: i64,
    pub status: ApplicationStatus,
    pub interview_date: Option<DateTime<Utc>>,
    pub interview_mode: Option<InterviewMode>,
    pub interview_location: Option<String>,
    pub interview_link: Option<String>,
    pub interview_notes: Option<String>,
    pub interview_status: Option<InterviewStatus>,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
