use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::auth::ActorKind;

/// A job posting, reduced to what the lifecycle engine needs: its identity
/// and its single owner. Authorization on an application is always derived
/// from the owning job, never from the application row itself.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobRow {
    pub id: i64,
    pub title: String,
    pub created_by_type: ActorKind,
    pub created_by_id: i64,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl JobRow {
    /// True when the actor is the job's one owner, the only principal
    /// allowed to decide on its applications.
    pub fn is_owned_by(&self, kind: ActorKind, id: i64) -> bool {
        self.created_by_type == kind && self.created_by_id == id
    }
}
