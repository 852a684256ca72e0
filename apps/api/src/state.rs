use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::email::Mailer;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
    /// Pluggable outbound mailer. Default: HTTP relay; NoopMailer when
    /// MAIL_ENDPOINT is unset (local dev, tests).
    pub mailer: Arc<dyn Mailer>,
}
