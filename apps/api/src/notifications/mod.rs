//! In-app notification writes and the per-user feed.
//!
//! The orchestrator records a notification after every committed status
//! transition. Writes here are best-effort from the caller's point of view:
//! a failed insert is logged and never fails the core operation that
//! triggered it. Delivery transport (email, push) is out of scope.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::notification::{NotificationKind, NotificationRow};

pub mod handlers;

pub async fn create(
    pool: &PgPool,
    user_id: i64,
    title: &str,
    message: &str,
    kind: NotificationKind,
    related_id: Option<i64>,
    expires_at: Option<DateTime<Utc>>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO notifications (id, user_id, title, message, kind, related_id, expires_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(title)
    .bind(message)
    .bind(kind)
    .bind(related_id)
    .bind(expires_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Non-fatal notification insert: failures are logged, never propagated.
pub async fn create_or_log(
    pool: &PgPool,
    user_id: i64,
    title: &str,
    message: &str,
    kind: NotificationKind,
    related_id: Option<i64>,
    expires_at: Option<DateTime<Utc>>,
) {
    if let Err(e) = create(pool, user_id, title, message, kind, related_id, expires_at).await {
        warn!("Failed to create notification for user {user_id}: {e}");
    }
}

/// Unexpired notifications for a user, newest first.
pub async fn list_for_user(pool: &PgPool, user_id: i64) -> Result<Vec<NotificationRow>, AppError> {
    Ok(sqlx::query_as(
        r#"
        SELECT * FROM notifications
        WHERE user_id = $1 AND (expires_at IS NULL OR expires_at > now())
        ORDER BY created_at DESC
        LIMIT 100
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?)
}

/// Marks one of the user's notifications read.
pub async fn mark_read(pool: &PgPool, user_id: i64, id: Uuid) -> Result<(), AppError> {
    let result = sqlx::query("UPDATE notifications SET read = true WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Notification {id} not found")));
    }
    Ok(())
}
