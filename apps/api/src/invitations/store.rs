use chrono::{Duration, Utc};
use rand::Rng;
use sqlx::PgPool;
use tracing::{debug, info};

use crate::email::Mailer;
use crate::errors::AppError;
use crate::models::invitation::{InvitationRow, InvitationStatus};

/// Inclusive bounds of the 8-digit token space.
const TOKEN_MIN: u64 = 10_000_000;
const TOKEN_MAX: u64 = 99_999_999;

/// Redraws on token collision before giving up.
const MAX_TOKEN_ATTEMPTS: u32 = 5;

const INVITATION_TTL_DAYS: i64 = 7;

/// Draws a uniform random 8-digit decimal token.
pub fn generate_token() -> String {
    rand::thread_rng()
        .gen_range(TOKEN_MIN..=TOKEN_MAX)
        .to_string()
}

/// Idempotent lazy expiry sweep: flips every `pending` invitation past its
/// deadline to `expired`. Invoked before any token read so callers always
/// observe post-expiry state without a background scheduler.
pub async fn sweep_expired(pool: &PgPool) -> Result<(), AppError> {
    let result = sqlx::query(
        "UPDATE invitations SET status = 'expired' WHERE status = 'pending' AND expires_at <= $1",
    )
    .bind(Utc::now())
    .execute(pool)
    .await?;

    if result.rows_affected() > 0 {
        debug!("Expired {} stale invitation(s)", result.rows_affected());
    }
    Ok(())
}

/// Issues a new invitation for `target_email` and emails the token.
///
/// The insert and the email send share one transaction: delivery failure
/// rolls back the invitation, the only place a side-effect failure undoes
/// a core write. Token collisions redraw up to `MAX_TOKEN_ATTEMPTS` times.
pub async fn issue(
    pool: &PgPool,
    mailer: &dyn Mailer,
    issuer_id: i64,
    target_email: &str,
    message: &str,
) -> Result<InvitationRow, AppError> {
    let already_registered: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM companies WHERE email = $1)")
            .bind(target_email)
            .fetch_one(pool)
            .await?;
    if already_registered {
        return Err(AppError::DuplicateTarget(format!(
            "{target_email} already belongs to a registered company"
        )));
    }

    let created_at = Utc::now();
    let expires_at = created_at + Duration::days(INVITATION_TTL_DAYS);

    for _ in 0..MAX_TOKEN_ATTEMPTS {
        let token = generate_token();
        let mut tx = pool.begin().await?;

        let inserted: Option<InvitationRow> = sqlx::query_as(
            r#"
            INSERT INTO invitations
                (issuer_id, target_email, message, token, status, created_at, expires_at)
            VALUES ($1, $2, $3, $4, 'pending', $5, $6)
            ON CONFLICT (token) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(issuer_id)
        .bind(target_email)
        .bind(message)
        .bind(&token)
        .bind(created_at)
        .bind(expires_at)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(invitation) = inserted else {
            // Token collision: redraw.
            tx.rollback().await?;
            continue;
        };

        let subject = "You have been invited to join the OJT placement portal";
        let body = format!(
            "Registration code: {token}\nValid until: {expires_at}\n\n{message}",
        );
        if let Err(e) = mailer.send(target_email, subject, &body).await {
            tx.rollback().await?;
            return Err(AppError::Email(e.to_string()));
        }

        tx.commit().await?;
        info!(
            "Issued invitation {} for {target_email} (expires {expires_at})",
            invitation.id
        );
        return Ok(invitation);
    }

    Err(AppError::Internal(anyhow::anyhow!(
        "could not allocate a unique invitation token after {MAX_TOKEN_ATTEMPTS} attempts"
    )))
}

/// Looks up an invitation by token, after the expiry sweep.
/// `used` and `expired` invitations surface as `InvalidState` with the
/// status as the structured reason.
pub async fn validate(pool: &PgPool, token: &str) -> Result<InvitationRow, AppError> {
    sweep_expired(pool).await?;

    let invitation: Option<InvitationRow> =
        sqlx::query_as("SELECT * FROM invitations WHERE token = $1")
            .bind(token)
            .fetch_optional(pool)
            .await?;

    let invitation =
        invitation.ok_or_else(|| AppError::NotFound("No invitation for that token".to_string()))?;

    match invitation.status {
        InvitationStatus::Pending => Ok(invitation),
        status => Err(AppError::InvalidState {
            reason: status.as_str().to_string(),
        }),
    }
}

/// Consumes a pending token on behalf of the newly registered company.
///
/// The flip to `used` is a single conditional UPDATE, never a
/// read-then-write: of two concurrent consumers exactly one sees a row
/// updated; the loser gets `AlreadyConsumed`. The coordinator↔company
/// affiliation is recorded in the same transaction.
pub async fn consume(
    pool: &PgPool,
    token: &str,
    company_id: i64,
) -> Result<InvitationRow, AppError> {
    sweep_expired(pool).await?;

    let mut tx = pool.begin().await?;

    let consumed: Option<InvitationRow> = sqlx::query_as(
        r#"
        UPDATE invitations
        SET status = 'used', used_at = $2, resulting_company_id = $3
        WHERE token = $1 AND status = 'pending'
        RETURNING *
        "#,
    )
    .bind(token)
    .bind(Utc::now())
    .bind(company_id)
    .fetch_optional(&mut *tx)
    .await?;

    let invitation = consumed.ok_or(AppError::AlreadyConsumed)?;

    sqlx::query(
        r#"
        INSERT INTO company_coordinators (coordinator_id, company_id)
        VALUES ($1, $2)
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(invitation.issuer_id)
    .bind(company_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    info!(
        "Invitation {} consumed by company {company_id}",
        invitation.id
    );
    Ok(invitation)
}

/// All invitations issued by a coordinator, newest first, post-sweep.
pub async fn list_by_issuer(pool: &PgPool, issuer_id: i64) -> Result<Vec<InvitationRow>, AppError> {
    sweep_expired(pool).await?;

    Ok(
        sqlx::query_as("SELECT * FROM invitations WHERE issuer_id = $1 ORDER BY created_at DESC")
            .bind(issuer_id)
            .fetch_all(pool)
            .await?,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_is_eight_digits() {
        for _ in 0..1000 {
            let token = generate_token();
            assert_eq!(token.len(), 8, "unexpected token {token}");
            assert!(token.chars().all(|c| c.is_ascii_digit()));
            assert_ne!(token.as_bytes()[0], b'0');
        }
    }

    #[test]
    fn test_token_range_bounds() {
        for _ in 0..1000 {
            let n: u64 = generate_token().parse().unwrap();
            assert!((TOKEN_MIN..=TOKEN_MAX).contains(&n));
        }
    }
}
