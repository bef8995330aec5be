use std::future::Future;

use anyhow::{Context, Result};
use workflow_notify_core::card::Notification;

/// Delivers a composed notification.
pub trait WebhookSender {
    fn send(
        &self,
        uri: &str,
        notification: &Notification,
    ) -> impl Future<Output = Result<()>> + Send;
}

/// Posts the MessageCard JSON to an incoming webhook.
#[derive(Clone, Default)]
pub struct HttpWebhook {
    client: reqwest::Client,
}

impl HttpWebhook {
    pub fn new() -> Self { Self::default() }
}

impl WebhookSender for HttpWebhook {
    async fn send(&self, uri: &str, notification: &Notification) -> Result<()> {
        let response = self
            .client
            .post(uri)
            .json(&notification.to_card())
            .send()
            .await
            .context("Failed to send webhook request")?;
        let status = response.status();
        response.error_for_status().with_context(|| format!("Webhook responded with {status}"))?;
        tracing::debug!("Webhook accepted notification ({})", status);
        Ok(())
    }
}
