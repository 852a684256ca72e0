use sqlx::PgPool;

use crate::auth::ActorKind;
use crate::errors::AppError;
use crate::models::rating::{RateeKind, RatingAggregate, RatingRow};

/// Context recorded for applicant ratings, which carry no caller-supplied
/// context; the uniqueness tuple still needs a value.
const IMPLICIT_CONTEXT: &str = "general";

pub const DEFAULT_HISTORY_LIMIT: i64 = 50;
pub const MAX_HISTORY_LIMIT: i64 = 200;

/// Contexts a caller may rate a given entity kind under.
/// Applicants take none; theirs is always implicit.
pub fn allowed_contexts(ratee: RateeKind) -> &'static [&'static str] {
    match ratee {
        RateeKind::Job => &["job_post"],
        RateeKind::Coordinator | RateeKind::Company => &["job_post", "team_page"],
        RateeKind::Applicant => &[],
    }
}

/// Resolves the stored context for a submission, enforcing the per-kind
/// allow-list.
pub fn normalize_context(ratee: RateeKind, context: Option<&str>) -> Result<String, AppError> {
    let allowed = allowed_contexts(ratee);

    match (allowed.is_empty(), context) {
        (true, None) => Ok(IMPLICIT_CONTEXT.to_string()),
        (true, Some(_)) => Err(AppError::Validation(format!(
            "{} ratings take no context",
            ratee.as_str()
        ))),
        (false, Some(ctx)) if allowed.contains(&ctx) => Ok(ctx.to_string()),
        (false, Some(ctx)) => Err(AppError::Validation(format!(
            "context '{ctx}' is not valid for ratee type {}; allowed: {}",
            ratee.as_str(),
            allowed.join(", ")
        ))),
        (false, None) => Err(AppError::Validation(format!(
            "context is required for ratee type {}",
            ratee.as_str()
        ))),
    }
}

fn validate_value(value: i16) -> Result<(), AppError> {
    if (1..=5).contains(&value) {
        Ok(())
    } else {
        Err(AppError::Validation(
            "value must be an integer between 1 and 5".to_string(),
        ))
    }
}

/// Two-decimal rounding applied to every persisted average.
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

#[derive(Debug)]
pub struct RatingSubmission {
    pub rater_id: i64,
    pub rater_type: ActorKind,
    pub ratee_id: i64,
    pub ratee_type: RateeKind,
    pub context: Option<String>,
    pub job_id: Option<i64>,
    pub value: i16,
    pub review: Option<String>,
}

/// Upserts a rating and synchronously recomputes the ratee's aggregate.
///
/// Re-submission on the same `(rater, ratee, ratee_type, context)` tuple
/// replaces the row in place, never a second row. The upsert and the
/// AVG/COUNT recomputation share one transaction so concurrent raters
/// cannot leave the aggregate drifted; the fresh aggregate is returned so
/// callers need no second read.
pub async fn submit(pool: &PgPool, input: RatingSubmission) -> Result<RatingAggregate, AppError> {
    validate_value(input.value)?;
    let context = normalize_context(input.ratee_type, input.context.as_deref())?;

    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO ratings
            (rater_id, rater_type, ratee_id, ratee_type, context, job_id, value, review)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ON CONFLICT (rater_id, ratee_id, ratee_type, context)
        DO UPDATE SET
            value = EXCLUDED.value,
            review = EXCLUDED.review,
            job_id = EXCLUDED.job_id,
            updated_at = now()
        "#,
    )
    .bind(input.rater_id)
    .bind(input.rater_type)
    .bind(input.ratee_id)
    .bind(input.ratee_type)
    .bind(&context)
    .bind(input.job_id)
    .bind(input.value)
    .bind(&input.review)
    .execute(&mut *tx)
    .await?;

    let (average, count): (f64, i64) = sqlx::query_as(
        r#"
        SELECT COALESCE(AVG(value)::float8, 0), COUNT(*)
        FROM ratings
        WHERE ratee_id = $1 AND ratee_type = $2
        "#,
    )
    .bind(input.ratee_id)
    .bind(input.ratee_type)
    .fetch_one(&mut *tx)
    .await?;

    let average = round2(average);

    sqlx::query(
        r#"
        INSERT INTO rating_aggregates (ratee_id, ratee_type, average, count, updated_at)
        VALUES ($1, $2, $3, $4, now())
        ON CONFLICT (ratee_id, ratee_type)
        DO UPDATE SET average = EXCLUDED.average, count = EXCLUDED.count, updated_at = now()
        "#,
    )
    .bind(input.ratee_id)
    .bind(input.ratee_type)
    .bind(average)
    .bind(count)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(RatingAggregate {
        ratee_id: input.ratee_id,
        ratee_type: input.ratee_type,
        average,
        count,
    })
}

/// O(1) aggregate read. An unrated entity answers `{average: 0, count: 0}`,
/// never null. The UI relies on the explicit zero state.
pub async fn aggregate_for(
    pool: &PgPool,
    ratee_id: i64,
    ratee_type: RateeKind,
) -> Result<RatingAggregate, AppError> {
    let aggregate: Option<RatingAggregate> = sqlx::query_as(
        "SELECT ratee_id, ratee_type, average, count FROM rating_aggregates
         WHERE ratee_id = $1 AND ratee_type = $2",
    )
    .bind(ratee_id)
    .bind(ratee_type)
    .fetch_optional(pool)
    .await?;

    Ok(aggregate.unwrap_or_else(|| RatingAggregate::zero(ratee_id, ratee_type)))
}

/// Individual ratings for a ratee, newest first.
pub async fn history(
    pool: &PgPool,
    ratee_id: i64,
    ratee_type: RateeKind,
    limit: i64,
    offset: i64,
) -> Result<Vec<RatingRow>, AppError> {
    let limit = limit.clamp(1, MAX_HISTORY_LIMIT);

    Ok(sqlx::query_as(
        r#"
        SELECT * FROM ratings
        WHERE ratee_id = $1 AND ratee_type = $2
        ORDER BY created_at DESC
        LIMIT $3 OFFSET $4
        "#,
    )
    .bind(ratee_id)
    .bind(ratee_type)
    .bind(limit)
    .bind(offset.max(0))
    .fetch_all(pool)
    .await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_accepts_only_job_post_context() {
        assert_eq!(
            normalize_context(RateeKind::Job, Some("job_post")).unwrap(),
            "job_post"
        );
        assert!(normalize_context(RateeKind::Job, Some("team_page")).is_err());
    }

    #[test]
    fn test_coordinator_and_company_accept_team_page() {
        for kind in [RateeKind::Coordinator, RateeKind::Company] {
            assert_eq!(
                normalize_context(kind, Some("team_page")).unwrap(),
                "team_page"
            );
            assert_eq!(
                normalize_context(kind, Some("job_post")).unwrap(),
                "job_post"
            );
        }
    }

    #[test]
    fn test_applicant_context_is_implicit() {
        assert_eq!(
            normalize_context(RateeKind::Applicant, None).unwrap(),
            IMPLICIT_CONTEXT
        );
    }

    #[test]
    fn test_applicant_rejects_explicit_context() {
        assert!(normalize_context(RateeKind::Applicant, Some("job_post")).is_err());
    }

    #[test]
    fn test_missing_context_rejected_where_required() {
        assert!(normalize_context(RateeKind::Job, None).is_err());
        assert!(normalize_context(RateeKind::Company, None).is_err());
    }

    #[test]
    fn test_value_bounds() {
        assert!(validate_value(1).is_ok());
        assert!(validate_value(5).is_ok());
        assert!(validate_value(0).is_err());
        assert!(validate_value(6).is_err());
        assert!(validate_value(-3).is_err());
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(11.0 / 3.0), 3.67);
        assert_eq!(round2(13.0 / 3.0), 4.33);
        assert_eq!(round2(3.5), 3.5);
        assert_eq!(round2(0.0), 0.0);
    }
}
