//! Email delivery with a provider fallback chain.
//!
//! 1. Primary relay, retried with exponential backoff while errors are transient.
//! 2. Sandbox relay, one attempt.
//! 3. [`MailSpool`] on local disk, so the message is never silently dropped.

use super::{
    local_failure, spawn_spool_write, Channel, ChannelSender, DeliveryError, DeliveryFailure,
    DeliveryResult, DeliveryStatus, MailSpool, RenderedMessage, SendProgress,
};
use crate::config::HttpEndpoint;
use async_trait::async_trait;
use resource_actor::retry::{retry, Attempted, RetryPolicy};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    #[serde(rename = "text")]
    pub body: String,
}

/// One email provider. Returns the provider's message id.
#[async_trait]
pub trait EmailTransport: Send + Sync {
    fn name(&self) -> &str;
    async fn deliver(&self, email: &OutgoingEmail) -> Result<String, DeliveryError>;
}

/// JSON-over-HTTPS mail relay (`POST {url}` with a bearer key).
pub struct HttpEmailTransport {
    name: String,
    client: reqwest::Client,
    endpoint: HttpEndpoint,
}

impl HttpEmailTransport {
    pub fn new(
        name: impl Into<String>,
        endpoint: HttpEndpoint,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            name: name.into(),
            client,
            endpoint,
        })
    }
}

#[async_trait]
impl EmailTransport for HttpEmailTransport {
    fn name(&self) -> &str {
        &self.name
    }

    async fn deliver(&self, email: &OutgoingEmail) -> Result<String, DeliveryError> {
        let response = self
            .client
            .post(&self.endpoint.url)
            .bearer_auth(&self.endpoint.api_key)
            .json(email)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DeliveryError::from_status(status.as_u16(), &body));
        }

        let body: serde_json::Value = response.json().await.unwrap_or_default();
        Ok(body["id"]
            .as_str()
            .or_else(|| body["messageId"].as_str())
            .unwrap_or("accepted")
            .to_string())
    }
}

pub struct EmailSender {
    from: String,
    primary: Option<Arc<dyn EmailTransport>>,
    sandbox: Option<Arc<dyn EmailTransport>>,
    spool: MailSpool,
    policy: RetryPolicy,
}

impl EmailSender {
    /// `policy.max_attempts` bounds the primary provider only; the sandbox gets one attempt.
    pub fn new(
        from: impl Into<String>,
        primary: Option<Arc<dyn EmailTransport>>,
        sandbox: Option<Arc<dyn EmailTransport>>,
        spool: MailSpool,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            from: from.into(),
            primary,
            sandbox,
            spool,
            policy,
        }
    }

    fn compose(&self, to: &str, message: &RenderedMessage) -> OutgoingEmail {
        OutgoingEmail {
            from: self.from.clone(),
            to: to.to_string(),
            subject: message
                .subject
                .clone()
                .unwrap_or_else(|| "Order update".to_string()),
            body: message.body.clone(),
        }
    }

    fn sent(&self, email: &OutgoingEmail, provider: &str, id: String, attempts: u32) -> DeliveryResult {
        DeliveryResult {
            channel: Channel::Email,
            provider: provider.to_string(),
            destination: email.to.clone(),
            status: DeliveryStatus::Sent,
            message_id: Some(id),
            attempts,
        }
    }

    /// Spool `email` once per send. A write already started for this send is awaited instead of
    /// writing a second file.
    async fn spool(
        &self,
        email: &OutgoingEmail,
        reason: &str,
        progress: &SendProgress,
    ) -> Result<DeliveryResult, DeliveryFailure> {
        let write = progress.spool_write(|| {
            let spool = self.spool.clone();
            let email = email.clone();
            let reason = reason.to_string();
            spawn_spool_write(async move { spool.write(&email, &reason).await })
        });
        let attempts = progress.attempts();
        match write.await {
            Ok(path) => Ok(DeliveryResult {
                channel: Channel::Email,
                provider: "local-spool".to_string(),
                destination: email.to.clone(),
                status: DeliveryStatus::Spooled,
                message_id: Some(path.display().to_string()),
                attempts,
            }),
            Err(e) => Err(Attempted {
                value: DeliveryError::Unknown(format!("spool write failed: {e}")),
                attempts,
            }),
        }
    }
}

#[async_trait]
impl ChannelSender for EmailSender {
    fn channel(&self) -> Channel {
        Channel::Email
    }

    async fn send(
        &self,
        destination: &str,
        message: &RenderedMessage,
    ) -> Result<DeliveryResult, DeliveryFailure> {
        self.send_tracked(destination, message, &SendProgress::default())
            .await
    }

    #[instrument(skip_all, fields(channel = "email", to = %destination))]
    async fn send_tracked(
        &self,
        destination: &str,
        message: &RenderedMessage,
        progress: &SendProgress,
    ) -> Result<DeliveryResult, DeliveryFailure> {
        if destination.trim().is_empty() {
            return Err(local_failure(DeliveryError::MissingDestination(
                Channel::Email,
            )));
        }
        let email = self.compose(destination.trim(), message);
        let mut last_error = "no email provider configured".to_string();

        if let Some(primary) = &self.primary {
            let transport = primary.as_ref();
            let outgoing = &email;
            match retry(&self.policy, DeliveryError::is_retryable, |_| {
                progress.record_attempt();
                transport.deliver(outgoing)
            })
            .await
            {
                Ok(done) => {
                    info!(provider = transport.name(), attempts = done.attempts, "Email sent");
                    return Ok(self.sent(&email, transport.name(), done.value, progress.attempts()));
                }
                Err(failed) => {
                    warn!(provider = transport.name(), attempts = failed.attempts, error = %failed.value, "Primary email provider failed");
                    last_error = failed.value.to_string();
                }
            }
        }

        if let Some(sandbox) = &self.sandbox {
            progress.record_attempt();
            match sandbox.deliver(&email).await {
                Ok(id) => {
                    let attempts = progress.attempts();
                    info!(provider = sandbox.name(), attempts, "Email sent via fallback");
                    return Ok(self.sent(&email, sandbox.name(), id, attempts));
                }
                Err(e) => {
                    warn!(provider = sandbox.name(), error = %e, "Fallback email provider failed");
                    last_error = e.to_string();
                }
            }
        }

        self.spool(&email, &last_error, progress).await
    }

    async fn on_deadline(
        &self,
        destination: &str,
        message: &RenderedMessage,
        progress: &SendProgress,
    ) -> Option<DeliveryResult> {
        if destination.trim().is_empty() {
            return None;
        }
        let email = self.compose(destination.trim(), message);
        self.spool(&email, "dispatch deadline exceeded", progress)
            .await
            .ok()
    }
}
