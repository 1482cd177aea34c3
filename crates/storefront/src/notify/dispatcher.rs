use super::render::render;
use super::{
    ActivityLogEntry, ActivityLogSink, NotificationAttempt, NotificationDispatchResult,
    OrderEvent, Recipient, SkipReason, SkippedChannel,
};
use crate::channels::{
    Channel, ChannelSender, DeliveryError, DeliveryFailure, DeliveryResult, ErrorClass,
    RenderedMessage, SendProgress, TransientKind,
};
use crate::model::Order;
use chrono::Utc;
use futures::future::join_all;
use resource_actor::retry::Attempted;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinError;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// One sender per channel.
#[derive(Clone)]
pub struct ChannelSenders {
    pub email: Arc<dyn ChannelSender>,
    pub sms: Arc<dyn ChannelSender>,
    pub whatsapp: Arc<dyn ChannelSender>,
}

impl ChannelSenders {
    fn get(&self, channel: Channel) -> Arc<dyn ChannelSender> {
        match channel {
            Channel::Email => self.email.clone(),
            Channel::Sms => self.sms.clone(),
            Channel::WhatsApp => self.whatsapp.clone(),
        }
    }
}

enum Selection {
    Attempt(String),
    Skip(SkipReason),
}

pub struct NotificationDispatcher {
    senders: ChannelSenders,
    activity_log: Arc<dyn ActivityLogSink>,
    channel_timeout: Duration,
}

impl NotificationDispatcher {
    pub fn new(
        senders: ChannelSenders,
        activity_log: Arc<dyn ActivityLogSink>,
        channel_timeout: Duration,
    ) -> Self {
        Self {
            senders,
            activity_log,
            channel_timeout,
        }
    }

    /// Deliver `event` on every eligible channel and append one activity entry.
    ///
    /// Never fails. Channel errors, timeouts and panics end up as failed attempts, and an
    /// activity log failure is only logged.
    #[instrument(skip_all, fields(order_id = %order.id, event = event.kind()))]
    pub async fn dispatch(
        &self,
        event: &OrderEvent,
        order: &Order,
        recipient: &Recipient,
    ) -> NotificationDispatchResult {
        let mut skipped = Vec::new();
        let mut tasks = Vec::new();

        for channel in [Channel::Email, Channel::Sms, Channel::WhatsApp] {
            match select(channel, event, order, recipient) {
                Selection::Skip(reason) => skipped.push(SkippedChannel { channel, reason }),
                Selection::Attempt(destination) => {
                    let sender = self.senders.get(channel);
                    let message = render(event, order, &recipient.name, channel);
                    let deadline = self.channel_timeout;
                    let handle = tokio::spawn(async move {
                        send_with_deadline(sender, destination, message, deadline).await
                    });
                    tasks.push(async move { (channel, handle.await) });
                }
            }
        }

        let attempts: Vec<NotificationAttempt> = join_all(tasks)
            .await
            .into_iter()
            .map(|(channel, joined)| record(channel, order, recipient, joined))
            .collect();
        let success = attempts.iter().any(|a| a.outcome.is_delivered());

        info!(
            attempted = attempts.len(),
            skipped = skipped.len(),
            success,
            "Dispatch settled"
        );

        let result = NotificationDispatchResult {
            success,
            attempts,
            skipped,
        };

        let entry = ActivityLogEntry {
            id: Uuid::new_v4(),
            recorded_at: Utc::now(),
            order_id: order.id,
            user_id: recipient.user_id,
            event: event.kind(),
            success,
            attempts: result.attempts.clone(),
            skipped: result.skipped.clone(),
        };
        if let Err(e) = self.activity_log.append(entry).await {
            warn!(error = %e, "Activity log append failed");
        }

        result
    }
}

fn select(channel: Channel, event: &OrderEvent, order: &Order, recipient: &Recipient) -> Selection {
    let prefs = &recipient.preferences;
    if event.is_status_update() && !prefs.order_updates {
        return Selection::Skip(SkipReason::OrderUpdatesOff);
    }

    let phone = || {
        recipient
            .phone
            .clone()
            .or_else(|| order.shipping_address.phone.clone())
            .filter(|p| !p.trim().is_empty())
    };

    match channel {
        Channel::Email if prefs.email_notifications => {
            Selection::Attempt(recipient.email.clone().unwrap_or_default())
        }
        Channel::Sms if prefs.sms_notifications => match phone() {
            Some(p) => Selection::Attempt(p),
            None => Selection::Skip(SkipReason::NoPhone),
        },
        Channel::WhatsApp if prefs.whatsapp_notifications => match phone() {
            Some(p) => Selection::Attempt(p),
            None => Selection::Skip(SkipReason::NoPhone),
        },
        _ => Selection::Skip(SkipReason::Disabled),
    }
}

async fn send_with_deadline(
    sender: Arc<dyn ChannelSender>,
    destination: String,
    message: RenderedMessage,
    deadline: Duration,
) -> Result<DeliveryResult, DeliveryFailure> {
    let progress = SendProgress::default();
    let sending = sender.send_tracked(&destination, &message, &progress);
    match tokio::time::timeout(deadline, sending).await {
        Ok(outcome) => outcome,
        Err(_) => {
            let channel = sender.channel();
            let attempts = progress.attempts();
            warn!(%channel, attempts, deadline_ms = deadline.as_millis() as u64, "Channel missed deadline");
            match sender.on_deadline(&destination, &message, &progress).await {
                Some(result) => Ok(result),
                None => Err(Attempted {
                    value: DeliveryError::transient(
                        TransientKind::Timeout,
                        format!("{channel} exceeded {}ms", deadline.as_millis()),
                    ),
                    attempts: attempts.max(1),
                }),
            }
        }
    }
}

fn record(
    channel: Channel,
    order: &Order,
    recipient: &Recipient,
    joined: Result<Result<DeliveryResult, DeliveryFailure>, JoinError>,
) -> NotificationAttempt {
    match joined {
        Ok(Ok(result)) => NotificationAttempt::delivered(order.id, recipient.user_id, result),
        Ok(Err(failed)) => {
            warn!(%channel, attempts = failed.attempts, error = %failed.value, "Channel failed");
            NotificationAttempt::failed(
                channel,
                order.id,
                recipient.user_id,
                failed.attempts,
                failed.value.class(),
                failed.value.to_string(),
            )
        }
        Err(join_error) => {
            warn!(%channel, error = %join_error, "Channel task aborted");
            NotificationAttempt::failed(
                channel,
                order.id,
                recipient.user_id,
                0,
                ErrorClass::Unknown,
                join_error.to_string(),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channels::{DeliveryStatus, EmailSender, EmailTransport, MailSpool, OutgoingEmail};
    use crate::model::{
        Address, NotificationPreferences, OrderCreate, OrderId, OrderStatus, OrderSummary,
        PaymentMethod, UserId,
    };
    use crate::notify::{AttemptOutcome, InMemoryActivityLog};
    use async_trait::async_trait;
    use resource_actor::retry::{Backoff, RetryPolicy};
    use rust_decimal_macros::dec;
    use std::sync::Mutex;

    /// Sender with a fixed behaviour that records every destination it was asked to use.
    struct FakeSender {
        channel: Channel,
        behaviour: Behaviour,
        seen: Mutex<Vec<String>>,
    }

    #[derive(Clone)]
    enum Behaviour {
        Deliver,
        Fail(DeliveryError),
        Hang,
    }

    impl FakeSender {
        fn new(channel: Channel, behaviour: Behaviour) -> Arc<Self> {
            Arc::new(Self {
                channel,
                behaviour,
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl ChannelSender for FakeSender {
        fn channel(&self) -> Channel {
            self.channel
        }

        async fn send(
            &self,
            destination: &str,
            _message: &RenderedMessage,
        ) -> Result<DeliveryResult, DeliveryFailure> {
            self.seen.lock().unwrap().push(destination.to_string());
            match &self.behaviour {
                Behaviour::Deliver => Ok(DeliveryResult {
                    channel: self.channel,
                    provider: "fake".into(),
                    destination: destination.to_string(),
                    status: DeliveryStatus::Sent,
                    message_id: None,
                    attempts: 1,
                }),
                Behaviour::Fail(e) => Err(Attempted {
                    value: e.clone(),
                    attempts: 1,
                }),
                Behaviour::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    unreachable!("deadline fires first")
                }
            }
        }
    }

    fn order(phone_on_address: Option<&str>) -> Order {
        let mut address = Address::new("Asha", "12 Lodhi Road", "New Delhi", "Delhi", "110003");
        address.phone = phone_on_address.map(str::to_string);
        let summary = OrderSummary {
            lines: vec![],
            samples: vec![],
            regular_subtotal: dec!(100),
            sample_subtotal: dec!(0),
            subtotal: dec!(100),
            shipping: dec!(50),
            tax_rate: dec!(0.18),
            tax: dec!(18),
            total: dec!(168),
            shipping_address: address,
            billing_address: None,
        };
        Order::from_summary(
            OrderId(1),
            OrderCreate {
                user_id: UserId(7),
                summary,
                payment_method: PaymentMethod::Upi,
                payment_id: Some("pay_1".into()),
            },
        )
    }

    fn recipient(preferences: NotificationPreferences, phone: Option<&str>) -> Recipient {
        Recipient {
            user_id: UserId(7),
            name: "Asha".into(),
            email: Some("asha@example.com".into()),
            phone: phone.map(str::to_string),
            preferences,
        }
    }

    fn all_on() -> NotificationPreferences {
        NotificationPreferences {
            sms_notifications: true,
            whatsapp_notifications: true,
            ..NotificationPreferences::default()
        }
    }

    fn dispatcher(
        email: Arc<FakeSender>,
        sms: Arc<FakeSender>,
        whatsapp: Arc<FakeSender>,
        log: Arc<InMemoryActivityLog>,
    ) -> NotificationDispatcher {
        NotificationDispatcher::new(
            ChannelSenders {
                email,
                sms,
                whatsapp,
            },
            log,
            Duration::from_millis(200),
        )
    }

    #[tokio::test]
    async fn all_channels_disabled_means_no_attempts() {
        let log = Arc::new(InMemoryActivityLog::default());
        let email = FakeSender::new(Channel::Email, Behaviour::Deliver);
        let d = dispatcher(
            email.clone(),
            FakeSender::new(Channel::Sms, Behaviour::Deliver),
            FakeSender::new(Channel::WhatsApp, Behaviour::Deliver),
            log.clone(),
        );

        let result = d
            .dispatch(
                &OrderEvent::Created,
                &order(None),
                &recipient(NotificationPreferences::silent(), Some("9876543210")),
            )
            .await;

        assert!(!result.success);
        assert!(result.attempts.is_empty());
        assert_eq!(result.skipped.len(), 3);
        assert!(email.seen.lock().unwrap().is_empty());
        assert_eq!(log.entries().len(), 1);
    }

    #[tokio::test]
    async fn one_failing_channel_does_not_sink_the_others() {
        let log = Arc::new(InMemoryActivityLog::default());
        let d = dispatcher(
            FakeSender::new(
                Channel::Email,
                Behaviour::Fail(DeliveryError::ProviderAuth("bad key".into())),
            ),
            FakeSender::new(Channel::Sms, Behaviour::Deliver),
            FakeSender::new(Channel::WhatsApp, Behaviour::Deliver),
            log.clone(),
        );

        let result = d
            .dispatch(&OrderEvent::Created, &order(None), &recipient(all_on(), Some("9876543210")))
            .await;

        assert!(result.success);
        assert_eq!(result.attempts.len(), 3);
        let email = result.attempt(Channel::Email).unwrap();
        assert_eq!(email.outcome, AttemptOutcome::Failure);
        assert_eq!(email.error, Some(ErrorClass::ProviderAuth));
        assert_eq!(
            result.attempt(Channel::Sms).unwrap().outcome,
            AttemptOutcome::Success
        );

        let entries = log.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].event, "created");
        assert_eq!(entries[0].attempts.len(), 3);
    }

    #[tokio::test]
    async fn slow_channel_times_out_without_blocking() {
        let d = dispatcher(
            FakeSender::new(Channel::Email, Behaviour::Deliver),
            FakeSender::new(Channel::Sms, Behaviour::Hang),
            FakeSender::new(Channel::WhatsApp, Behaviour::Deliver),
            Arc::new(InMemoryActivityLog::default()),
        );

        let result = d
            .dispatch(&OrderEvent::Created, &order(None), &recipient(all_on(), Some("9876543210")))
            .await;

        assert!(result.success);
        let sms = result.attempt(Channel::Sms).unwrap();
        assert_eq!(sms.outcome, AttemptOutcome::Failure);
        assert_eq!(sms.error, Some(ErrorClass::ProviderTransient));
    }

    /// Email relay that never answers.
    struct HangingTransport {
        calls: Mutex<u32>,
    }

    #[async_trait]
    impl EmailTransport for HangingTransport {
        fn name(&self) -> &str {
            "hanging"
        }

        async fn deliver(&self, _email: &OutgoingEmail) -> Result<String, DeliveryError> {
            *self.calls.lock().unwrap() += 1;
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn email_past_deadline_is_spooled_with_its_attempts() {
        let spool_dir = tempfile::tempdir().unwrap();
        let primary = Arc::new(HangingTransport {
            calls: Mutex::new(0),
        });
        let email = EmailSender::new(
            "orders@shop.test",
            Some(primary.clone() as Arc<dyn EmailTransport>),
            None,
            MailSpool::new(spool_dir.path()),
            RetryPolicy::new(2, Backoff::None),
        );
        let log = Arc::new(InMemoryActivityLog::default());
        let d = NotificationDispatcher::new(
            ChannelSenders {
                email: Arc::new(email),
                sms: FakeSender::new(Channel::Sms, Behaviour::Deliver),
                whatsapp: FakeSender::new(Channel::WhatsApp, Behaviour::Deliver),
            },
            log.clone(),
            Duration::from_millis(100),
        );

        let result = d
            .dispatch(&OrderEvent::Created, &order(None), &recipient(NotificationPreferences::default(), None))
            .await;

        assert!(!result.success);
        let attempt = result.attempt(Channel::Email).unwrap();
        assert_eq!(attempt.outcome, AttemptOutcome::Spooled);
        assert_eq!(attempt.provider.as_deref(), Some("local-spool"));
        assert_eq!(attempt.attempt, 1);
        assert_eq!(*primary.calls.lock().unwrap(), 1);

        let spooled = MailSpool::new(spool_dir.path()).pending().await.unwrap();
        assert_eq!(spooled.len(), 1);
        assert_eq!(spooled[0].to, "asha@example.com");
        assert_eq!(spooled[0].reason, "dispatch deadline exceeded");
        assert_eq!(log.entries()[0].attempts[0].outcome, AttemptOutcome::Spooled);
    }

    #[tokio::test]
    async fn phone_falls_back_to_shipping_address() {
        let sms = FakeSender::new(Channel::Sms, Behaviour::Deliver);
        let d = dispatcher(
            FakeSender::new(Channel::Email, Behaviour::Deliver),
            sms.clone(),
            FakeSender::new(Channel::WhatsApp, Behaviour::Deliver),
            Arc::new(InMemoryActivityLog::default()),
        );

        let prefs = NotificationPreferences {
            sms_notifications: true,
            ..NotificationPreferences::default()
        };
        d.dispatch(&OrderEvent::Created, &order(Some("91234 56789")), &recipient(prefs.clone(), None))
            .await;
        assert_eq!(*sms.seen.lock().unwrap(), vec!["91234 56789".to_string()]);

        let result = d
            .dispatch(&OrderEvent::Created, &order(None), &recipient(prefs, None))
            .await;
        assert!(result.skipped.contains(&SkippedChannel {
            channel: Channel::Sms,
            reason: SkipReason::NoPhone,
        }));
    }

    #[tokio::test]
    async fn status_updates_respect_order_updates_switch() {
        let d = dispatcher(
            FakeSender::new(Channel::Email, Behaviour::Deliver),
            FakeSender::new(Channel::Sms, Behaviour::Deliver),
            FakeSender::new(Channel::WhatsApp, Behaviour::Deliver),
            Arc::new(InMemoryActivityLog::default()),
        );
        let prefs = NotificationPreferences {
            order_updates: false,
            ..all_on()
        };
        let event = OrderEvent::StatusChanged {
            from: OrderStatus::Pending,
            to: OrderStatus::Confirmed,
        };

        let result = d
            .dispatch(&event, &order(None), &recipient(prefs.clone(), Some("9876543210")))
            .await;
        assert!(!result.success);
        assert!(result
            .skipped
            .iter()
            .all(|s| s.reason == SkipReason::OrderUpdatesOff));

        // Order confirmation is not a status update.
        let created = d
            .dispatch(&OrderEvent::Created, &order(None), &recipient(prefs, Some("9876543210")))
            .await;
        assert!(created.success);
    }

    struct BrokenLog;

    #[async_trait]
    impl ActivityLogSink for BrokenLog {
        async fn append(&self, _entry: ActivityLogEntry) -> Result<(), crate::notify::ActivityLogError> {
            Err(crate::notify::ActivityLogError::Unavailable("disk full".into()))
        }
    }

    #[tokio::test]
    async fn activity_log_failure_does_not_fail_dispatch() {
        let d = NotificationDispatcher::new(
            ChannelSenders {
                email: FakeSender::new(Channel::Email, Behaviour::Deliver),
                sms: FakeSender::new(Channel::Sms, Behaviour::Deliver),
                whatsapp: FakeSender::new(Channel::WhatsApp, Behaviour::Deliver),
            },
            Arc::new(BrokenLog),
            Duration::from_millis(200),
        );

        let result = d
            .dispatch(&OrderEvent::Created, &order(None), &recipient(NotificationPreferences::default(), None))
            .await;
        assert!(result.success);
        assert_eq!(result.attempts.len(), 1);
    }
}
