use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::auth::ActorKind;

/// The kind of entity being rated. One generic ledger is parameterized over
/// this tag instead of duplicating the rating logic per entity type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "ratee_kind", rename_all = "snake_case")]
pub enum RateeKind {
    Job,
    Coordinator,
    Company,
    Applicant,
}

impl RateeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RateeKind::Job => "job",
            RateeKind::Coordinator => "coordinator",
            RateeKind::Company => "company",
            RateeKind::Applicant => "applicant",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RatingRow {
    pub id: i64,
    pub rater_id: i64,
    pub rater_type: ActorKind,
    pub ratee_id: i64,
    pub ratee_type: RateeKind,
    pub context: String,
    pub job_id: Option<i64>,
    pub value: i16,
    pub review: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Materialized mean/count per ratee, recomputed synchronously on every
/// rating write so reads are O(1). The zero state is explicit: callers
/// never see null.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RatingAggregate {
    pub ratee_id: i64,
    pub ratee_type: RateeKind,
    pub average: f64,
    pub count: i64,
}

impl RatingAggregate {
    pub fn zero(ratee_id: i64, ratee_type: RateeKind) -> Self {
        Self {
            ratee_id,
            ratee_type,
            average: 0.0,
            count: 0,
        }
    }
}
