//! SMS and WhatsApp delivery.
//!
//! Both channels talk to the same kind of provider (a Twilio-style messages API); WhatsApp
//! only differs in `whatsapp:` addressing. Without credentials the sender runs in simulation
//! mode and reports [`DeliveryStatus::Simulated`] instead of failing.

use super::{
    local_failure, normalize_phone, Channel, ChannelSender, DeliveryError, DeliveryFailure,
    DeliveryResult, DeliveryStatus, RenderedMessage, SendProgress,
};
use crate::config::MessagingCredentials;
use async_trait::async_trait;
use resource_actor::retry::{retry, RetryPolicy};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument};
use uuid::Uuid;

/// One SMS/WhatsApp provider account. Returns the provider's message id.
#[async_trait]
pub trait MessagingProvider: Send + Sync {
    fn name(&self) -> &str;
    /// `to` is already in E.164 form.
    async fn send_message(&self, to: &str, body: &str) -> Result<String, DeliveryError>;
}

pub struct HttpMessagingProvider {
    client: reqwest::Client,
    messages_url: String,
    credentials: MessagingCredentials,
    whatsapp: bool,
}

impl HttpMessagingProvider {
    pub fn new(
        api_url: &str,
        credentials: MessagingCredentials,
        whatsapp: bool,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        let messages_url = format!(
            "{}/Accounts/{}/Messages.json",
            api_url.trim_end_matches('/'),
            credentials.account_sid
        );
        Ok(Self {
            client,
            messages_url,
            credentials,
            whatsapp,
        })
    }

    fn address(&self, number: &str) -> String {
        if self.whatsapp && !number.starts_with("whatsapp:") {
            format!("whatsapp:{number}")
        } else {
            number.to_string()
        }
    }
}

#[async_trait]
impl MessagingProvider for HttpMessagingProvider {
    fn name(&self) -> &str {
        if self.whatsapp {
            "whatsapp-api"
        } else {
            "sms-api"
        }
    }

    async fn send_message(&self, to: &str, body: &str) -> Result<String, DeliveryError> {
        let to = self.address(to);
        let from = self.address(&self.credentials.from);
        let response = self
            .client
            .post(&self.messages_url)
            .basic_auth(&self.credentials.account_sid, Some(&self.credentials.auth_token))
            .form(&[("To", to.as_str()), ("From", from.as_str()), ("Body", body)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(DeliveryError::from_status(status.as_u16(), &text));
        }
        let json: serde_json::Value = response.json().await.unwrap_or_default();
        Ok(json["sid"].as_str().unwrap_or("accepted").to_string())
    }
}

pub struct MessagingSender {
    channel: Channel,
    provider: Option<Arc<dyn MessagingProvider>>,
    policy: RetryPolicy,
    default_country_code: String,
}

impl MessagingSender {
    /// `provider: None` selects simulation mode.
    pub fn new(
        channel: Channel,
        provider: Option<Arc<dyn MessagingProvider>>,
        policy: RetryPolicy,
        default_country_code: impl Into<String>,
    ) -> Self {
        Self {
            channel,
            provider,
            policy,
            default_country_code: default_country_code.into(),
        }
    }

    pub fn is_simulated(&self) -> bool {
        self.provider.is_none()
    }
}

#[async_trait]
impl ChannelSender for MessagingSender {
    fn channel(&self) -> Channel {
        self.channel
    }

    async fn send(
        &self,
        destination: &str,
        message: &RenderedMessage,
    ) -> Result<DeliveryResult, DeliveryFailure> {
        self.send_tracked(destination, message, &SendProgress::default())
            .await
    }

    #[instrument(skip_all, fields(channel = %self.channel))]
    async fn send_tracked(
        &self,
        destination: &str,
        message: &RenderedMessage,
        progress: &SendProgress,
    ) -> Result<DeliveryResult, DeliveryFailure> {
        let to = normalize_phone(destination, &self.default_country_code)
            .ok_or_else(|| local_failure(DeliveryError::MissingDestination(self.channel)))?;

        let Some(provider) = self.provider.as_deref() else {
            info!(to = %to, "No provider configured, simulating delivery");
            return Ok(DeliveryResult {
                channel: self.channel,
                provider: "simulation".to_string(),
                destination: to,
                status: DeliveryStatus::Simulated,
                message_id: Some(format!("sim-{}", Uuid::new_v4())),
                attempts: 1,
            });
        };

        let body = message.body.as_str();
        let number = to.as_str();
        let done = retry(&self.policy, DeliveryError::is_retryable, |_| {
            progress.record_attempt();
            provider.send_message(number, body)
        })
        .await?;

        info!(provider = provider.name(), attempts = done.attempts, "Message sent");
        Ok(DeliveryResult {
            channel: self.channel,
            provider: provider.name().to_string(),
            destination: to.clone(),
            status: DeliveryStatus::Sent,
            message_id: Some(done.value),
            attempts: done.attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channels::TransientKind;
    use resource_actor::retry::Backoff;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingProvider {
        sent: Mutex<Vec<String>>,
        failures_before_success: Mutex<u32>,
    }

    #[async_trait]
    impl MessagingProvider for RecordingProvider {
        fn name(&self) -> &str {
            "recording"
        }

        async fn send_message(&self, to: &str, _body: &str) -> Result<String, DeliveryError> {
            let mut remaining = self.failures_before_success.lock().unwrap();
            if *remaining > 0 {
                *remaining -= 1;
                return Err(DeliveryError::transient(TransientKind::Timeout, "slow"));
            }
            self.sent.lock().unwrap().push(to.to_string());
            Ok("SM1".into())
        }
    }

    fn text() -> RenderedMessage {
        RenderedMessage {
            subject: None,
            body: "Your order has shipped".into(),
        }
    }

    fn policy() -> RetryPolicy {
        RetryPolicy::new(2, Backoff::Fixed(Duration::from_millis(1)))
    }

    #[tokio::test]
    async fn simulation_mode_reports_simulated() {
        let sms = MessagingSender::new(Channel::Sms, None, policy(), "91");
        assert!(sms.is_simulated());

        let result = sms.send("98765 43210", &text()).await.unwrap();
        assert_eq!(result.status, DeliveryStatus::Simulated);
        assert_eq!(result.destination, "+919876543210");
        assert!(result.message_id.unwrap().starts_with("sim-"));
    }

    #[tokio::test]
    async fn sends_normalized_number_with_retry() {
        let provider = Arc::new(RecordingProvider {
            failures_before_success: Mutex::new(1),
            ..Default::default()
        });
        let whatsapp = MessagingSender::new(
            Channel::WhatsApp,
            Some(provider.clone() as Arc<dyn MessagingProvider>),
            policy(),
            "91",
        );

        let result = whatsapp.send("09876543210", &text()).await.unwrap();
        assert_eq!(result.status, DeliveryStatus::Sent);
        assert_eq!(result.attempts, 2);
        assert_eq!(*provider.sent.lock().unwrap(), vec!["+919876543210".to_string()]);
    }

    #[tokio::test]
    async fn unusable_number_is_a_missing_destination() {
        let sms = MessagingSender::new(Channel::Sms, None, policy(), "91");
        let failed = sms.send("n/a", &text()).await.unwrap_err();
        assert_eq!(failed.value, DeliveryError::MissingDestination(Channel::Sms));
        assert_eq!(failed.attempts, 0);
    }
}
