//! Actor extraction.
//!
//! Session authentication lives in the upstream gateway; it forwards the
//! authenticated principal as `X-Actor-Id` / `X-Actor-Type` headers. This
//! module turns those into a typed [`Actor`] via an Axum extractor so every
//! handler states its authorization requirements against real types instead
//! of raw headers.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// The kind of principal acting on a request. Doubles as the rater
/// discriminator on the ratings table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "actor_kind", rename_all = "snake_case")]
pub enum ActorKind {
    /// Applicant / alumni account.
    User,
    Coordinator,
    Company,
}

impl ActorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActorKind::User => "user",
            ActorKind::Coordinator => "coordinator",
            ActorKind::Company => "company",
        }
    }
}

/// The authenticated principal for the current request.
#[derive(Debug, Clone, Copy)]
pub struct Actor {
    pub id: i64,
    pub kind: ActorKind,
}

impl Actor {
    /// Fails with `Forbidden` unless the actor is of the given kind.
    pub fn require_kind(&self, kind: ActorKind) -> Result<(), AppError> {
        if self.kind == kind {
            Ok(())
        } else {
            Err(AppError::Forbidden)
        }
    }
}

fn parse_actor(headers: &HeaderMap) -> Result<Actor, AppError> {
    let id = headers
        .get("x-actor-id")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<i64>().ok())
        .ok_or(AppError::Unauthorized)?;

    let kind = match headers.get("x-actor-type").and_then(|v| v.to_str().ok()) {
        Some("user") => ActorKind::User,
        Some("coordinator") => ActorKind::Coordinator,
        Some("company") => ActorKind::Company,
        _ => return Err(AppError::Unauthorized),
    };

    Ok(Actor { id, kind })
}

#[async_trait]
impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parse_actor(&parts.headers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(id: &str, kind: &str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert("x-actor-id", HeaderValue::from_str(id).unwrap());
        h.insert("x-actor-type", HeaderValue::from_str(kind).unwrap());
        h
    }

    #[test]
    fn test_parses_coordinator_actor() {
        let actor = parse_actor(&headers("42", "coordinator")).unwrap();
        assert_eq!(actor.id, 42);
        assert_eq!(actor.kind, ActorKind::Coordinator);
    }

    #[test]
    fn test_missing_headers_is_unauthorized() {
        let err = parse_actor(&HeaderMap::new()).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));
    }

    #[test]
    fn test_unknown_kind_is_unauthorized() {
        let err = parse_actor(&headers("1", "admin")).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));
    }

    #[test]
    fn test_non_numeric_id_is_unauthorized() {
        let err = parse_actor(&headers("abc", "user")).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));
    }

    #[test]
    fn test_require_kind_enforces() {
        let actor = Actor {
            id: 7,
            kind: ActorKind::User,
        };
        assert!(actor.require_kind(ActorKind::User).is_ok());
        assert!(matches!(
            actor.require_kind(ActorKind::Company),
            Err(AppError::Forbidden)
        ));
    }
}
