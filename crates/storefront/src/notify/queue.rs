//! Background dispatch: order operations hand the job to a bounded queue and return at once.

use super::{NotificationDispatcher, OrderEvent, Recipient};
use crate::model::Order;
use async_trait::async_trait;
use resource_actor::worker::{JobHandler, QueueError, WorkQueue};
use std::fmt;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::debug;

pub struct NotificationJob {
    pub event: OrderEvent,
    pub order: Order,
    pub recipient: Recipient,
}

/// Identifiers only; contact details stay out of logs.
impl fmt::Debug for NotificationJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationJob")
            .field("order_id", &self.order.id)
            .field("event", &self.event.kind())
            .finish_non_exhaustive()
    }
}

struct DispatchJobs {
    dispatcher: Arc<NotificationDispatcher>,
}

#[async_trait]
impl JobHandler<NotificationJob> for DispatchJobs {
    async fn handle(&self, job: NotificationJob) {
        let result = self
            .dispatcher
            .dispatch(&job.event, &job.order, &job.recipient)
            .await;
        debug!(
            order_id = %job.order.id,
            event = job.event.kind(),
            success = result.success,
            "Queued dispatch finished"
        );
    }
}

/// Producer handle. Dropping every clone lets the worker drain the backlog and stop.
#[derive(Clone)]
pub struct NotificationQueue {
    queue: WorkQueue<NotificationJob>,
}

impl NotificationQueue {
    pub fn spawn(dispatcher: Arc<NotificationDispatcher>, capacity: usize) -> (Self, JoinHandle<()>) {
        let (queue, handle) = WorkQueue::spawn("notifications", capacity, DispatchJobs { dispatcher });
        (Self { queue }, handle)
    }

    /// Rejects with [`QueueError::Full`] instead of waiting.
    pub fn try_enqueue(&self, job: NotificationJob) -> Result<(), QueueError> {
        self.queue.try_submit(job)
    }

    pub async fn enqueue(&self, job: NotificationJob) -> Result<(), QueueError> {
        self.queue.submit(job).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channels::{
        Channel, ChannelSender, DeliveryFailure, DeliveryResult, DeliveryStatus, RenderedMessage,
    };
    use crate::model::{
        Address, NotificationPreferences, OrderCreate, OrderId, OrderSummary, PaymentMethod,
        UserId,
    };
    use crate::notify::{ChannelSenders, InMemoryActivityLog};
    use rust_decimal_macros::dec;
    use std::time::Duration;

    struct Instant(Channel);

    #[async_trait]
    impl ChannelSender for Instant {
        fn channel(&self) -> Channel {
            self.0
        }

        async fn send(
            &self,
            destination: &str,
            _message: &RenderedMessage,
        ) -> Result<DeliveryResult, DeliveryFailure> {
            Ok(DeliveryResult {
                channel: self.0,
                provider: "instant".into(),
                destination: destination.to_string(),
                status: DeliveryStatus::Simulated,
                message_id: None,
                attempts: 1,
            })
        }
    }

    fn job(id: u32) -> NotificationJob {
        let summary = OrderSummary {
            lines: vec![],
            samples: vec![],
            regular_subtotal: dec!(1000),
            sample_subtotal: dec!(0),
            subtotal: dec!(1000),
            shipping: dec!(0),
            tax_rate: dec!(0.12),
            tax: dec!(120),
            total: dec!(1120),
            shipping_address: Address::new("Ravi", "4 FC Road", "Pune", "Maharashtra", "411004"),
            billing_address: None,
        };
        NotificationJob {
            event: OrderEvent::Created,
            order: Order::from_summary(
                OrderId(id),
                OrderCreate {
                    user_id: UserId(1),
                    summary,
                    payment_method: PaymentMethod::CashOnDelivery,
                    payment_id: None,
                },
            ),
            recipient: Recipient {
                user_id: UserId(1),
                name: "Ravi".into(),
                email: Some("ravi@example.com".into()),
                phone: None,
                preferences: NotificationPreferences::default(),
            },
        }
    }

    #[tokio::test]
    async fn queued_jobs_are_dispatched_before_shutdown() {
        let log = Arc::new(InMemoryActivityLog::default());
        let dispatcher = Arc::new(NotificationDispatcher::new(
            ChannelSenders {
                email: Arc::new(Instant(Channel::Email)),
                sms: Arc::new(Instant(Channel::Sms)),
                whatsapp: Arc::new(Instant(Channel::WhatsApp)),
            },
            log.clone(),
            Duration::from_secs(1),
        ));

        let (queue, handle) = NotificationQueue::spawn(dispatcher, 8);
        queue.enqueue(job(1)).await.unwrap();
        queue.try_enqueue(job(2)).unwrap();
        drop(queue);
        handle.await.unwrap();

        let entries = log.entries();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| e.success));
        assert_eq!(entries[0].order_id, OrderId(1));
    }

    #[test]
    fn debug_output_leaves_out_contact_details() {
        let mut queued = job(3);
        queued.recipient.phone = Some("9876543210".into());

        let printed = format!("{queued:?}");
        assert!(printed.contains("created"));
        assert!(!printed.contains("ravi@example.com"));
        assert!(!printed.contains("9876543210"));
        assert!(!printed.contains("FC Road"));
    }
}
