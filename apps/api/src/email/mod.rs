//! Outbound email — the single point of entry for all mail sent by the API.
//!
//! Delivery transport is an external collaborator (an HTTP relay); the core
//! only fires a send and decides whether a failure matters. Invitation
//! issuance is the one caller that treats failure as fatal; everywhere else
//! delivery errors are logged and swallowed.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::Config;

/// Outbound mailer trait. Implement this to swap transports without touching
/// callers. Carried in `AppState` as `Arc<dyn Mailer>`.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()>;
}

/// Selects the mailer backend from config: HTTP relay when `MAIL_ENDPOINT`
/// is set, log-only otherwise.
pub fn mailer_from_config(config: &Config) -> std::sync::Arc<dyn Mailer> {
    if config.mail_endpoint.is_empty() {
        std::sync::Arc::new(NoopMailer)
    } else {
        std::sync::Arc::new(HttpMailer::new(
            config.mail_endpoint.clone(),
            config.mail_from.clone(),
        ))
    }
}

#[derive(Serialize)]
struct OutboundMessage<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    body: &'a str,
}

/// Posts messages to the configured HTTP mail relay.
pub struct HttpMailer {
    client: Client,
    endpoint: String,
    from: String,
}

impl HttpMailer {
    pub fn new(endpoint: String, from: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(10))
                .build()
                .expect("Failed to build HTTP client"),
            endpoint,
            from,
        }
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&OutboundMessage {
                from: &self.from,
                to,
                subject,
                body,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            anyhow::bail!("mail relay returned status {}", response.status());
        }

        debug!("Mail sent to {to}: {subject}");
        Ok(())
    }
}

/// Log-only mailer for local dev and tests.
pub struct NoopMailer;

#[async_trait]
impl Mailer for NoopMailer {
    async fn send(&self, to: &str, subject: &str, _body: &str) -> anyhow::Result<()> {
        warn!("MAIL_ENDPOINT not configured; dropping mail to {to}: {subject}");
        Ok(())
    }
}
