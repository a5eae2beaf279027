//! Outbound mail adapters: an HTTP relay client and a logging no-op.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, info};
use url::Url;

use crate::application::mailer::{MailError, MailMessage, Mailer};
use crate::config::MailSettings;

#[derive(Debug, Serialize)]
struct RelayPayload<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html: &'a str,
}

/// POSTs rendered messages to an HTTP relay endpoint as JSON.
pub struct HttpMailer {
    client: Client,
    relay_url: Url,
    from_address: String,
}

impl HttpMailer {
    pub fn new(relay_url: Url, from_address: String) -> Result<Self, MailError> {
        let client = Client::builder()
            .user_agent(concat!("aula/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(MailError::from_transport)?;
        Ok(Self {
            client,
            relay_url,
            from_address,
        })
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, message: MailMessage) -> Result<(), MailError> {
        let payload = RelayPayload {
            from: &self.from_address,
            to: &message.to,
            subject: &message.subject,
            html: &message.html,
        };
        let response = self
            .client
            .post(self.relay_url.clone())
            .json(&payload)
            .send()
            .await
            .map_err(MailError::from_transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MailError::Relay(format!("status {status} body {body}")));
        }
        debug!(to = %message.to, subject = %message.subject, "Delivered mail to relay");
        Ok(())
    }
}

/// Stands in when no relay is configured: logs the envelope and drops it.
pub struct NoopMailer;

#[async_trait]
impl Mailer for NoopMailer {
    async fn send(&self, message: MailMessage) -> Result<(), MailError> {
        info!(
            to = %message.to,
            subject = %message.subject,
            "Mail relay not configured; dropping message"
        );
        Ok(())
    }
}

/// Picks the adapter matching the resolved settings.
pub fn build_mailer(settings: &MailSettings) -> Result<Arc<dyn Mailer>, MailError> {
    match settings.relay_url.as_ref() {
        Some(url) => Ok(Arc::new(HttpMailer::new(
            url.clone(),
            settings.from_address.clone(),
        )?)),
        None => Ok(Arc::new(NoopMailer)),
    }
}
