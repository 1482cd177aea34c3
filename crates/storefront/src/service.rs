//! # Order Service
//!
//! Checkout orchestration on top of the resource actors: prices carts, creates orders, drives
//! status transitions and fires the matching notification.
//!
//! Notification outcomes never turn a successful order operation into an error. They are
//! reported next to the result in [`Notified`].

use crate::clients::{OrderClient, UserDirectory};
use crate::model::{
    Address, CartItem, Order, OrderCreate, OrderId, OrderStatus, OrderSummary, PaymentMethod,
    Principal, UserId,
};
use crate::notify::{
    NotificationDispatchResult, NotificationDispatcher, NotificationJob, NotificationQueue,
    OrderEvent, Recipient,
};
use crate::order_actor::{OrderError, TransitionOutcome};
use crate::pricing::{PricingEngine, PricingError};
use crate::user_actor::UserError;
use resource_actor::worker::QueueError;
use resource_actor::ActorClient;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// What happened to the notification that accompanies an order operation.
#[derive(Debug, Clone, PartialEq)]
pub enum NotificationStatus {
    Delivered(NotificationDispatchResult),
    /// Handed to the background queue.
    Queued,
    /// Contact details or preferences could not be read.
    RecipientUnavailable(String),
    /// Same-status transition; nothing to announce.
    NotRequired,
}

/// An operation result plus the notification it triggered.
#[derive(Debug, Clone, PartialEq)]
pub struct Notified<T> {
    pub value: T,
    pub notification: NotificationStatus,
}

pub struct OrderService {
    pricing: PricingEngine,
    orders: OrderClient,
    users: Arc<dyn UserDirectory>,
    dispatcher: Arc<NotificationDispatcher>,
    queue: Option<NotificationQueue>,
}

impl OrderService {
    /// With `queue: None` every notification is dispatched inline and its result returned.
    pub fn new(
        pricing: PricingEngine,
        orders: OrderClient,
        users: Arc<dyn UserDirectory>,
        dispatcher: Arc<NotificationDispatcher>,
        queue: Option<NotificationQueue>,
    ) -> Self {
        Self {
            pricing,
            orders,
            users,
            dispatcher,
            queue,
        }
    }

    pub async fn compute_checkout_summary(
        &self,
        items: &[CartItem],
        shipping_address: &Address,
        billing_address: Option<&Address>,
    ) -> Result<OrderSummary, PricingError> {
        self.pricing
            .compute_summary(items, shipping_address, billing_address)
            .await
    }

    /// Persist a priced order in `pending` and send the order confirmation.
    ///
    /// Called once payment has settled; `payment_id` marks the order paid.
    #[instrument(skip(self, summary), fields(total = %summary.total))]
    pub async fn create_order(
        &self,
        user_id: UserId,
        summary: OrderSummary,
        payment_method: PaymentMethod,
        payment_id: Option<String>,
    ) -> Result<Notified<Order>, OrderError> {
        let id = self
            .orders
            .create_order(OrderCreate {
                user_id,
                summary,
                payment_method,
                payment_id,
            })
            .await?;
        let order = self.orders.require(id).await?;
        info!(order_id = %id, total = %order.total, "Order placed");

        let notification = self.notify(OrderEvent::Created, &order).await;
        Ok(Notified {
            value: order,
            notification,
        })
    }

    #[instrument(skip(self, tracking_number))]
    pub async fn transition_order_status(
        &self,
        id: OrderId,
        to: OrderStatus,
        actor: Principal,
        tracking_number: Option<String>,
    ) -> Result<Notified<Order>, OrderError> {
        let outcome = self.orders.transition(id, to, actor, tracking_number).await?;
        Ok(self.announce(outcome).await)
    }

    #[instrument(skip(self))]
    pub async fn cancel_order(
        &self,
        id: OrderId,
        actor: Principal,
    ) -> Result<Notified<Order>, OrderError> {
        let outcome = self.orders.cancel(id, actor).await?;
        Ok(self.announce(outcome).await)
    }

    /// Dispatch inline, bypassing the queue. Never fails.
    pub async fn dispatch_order_notification(
        &self,
        event: &OrderEvent,
        order: &Order,
        recipient: &Recipient,
    ) -> NotificationDispatchResult {
        self.dispatcher.dispatch(event, order, recipient).await
    }

    /// Tell the customer a delivery attempt failed. Operators only.
    #[instrument(skip(self, reason))]
    pub async fn report_delivery_failure(
        &self,
        id: OrderId,
        actor: Principal,
        reason: impl Into<String>,
    ) -> Result<NotificationDispatchResult, OrderError> {
        if !actor.is_operator() {
            return Err(OrderError::Forbidden(format!(
                "{} may not report delivery failures",
                actor.user_id
            )));
        }
        let order = self.orders.require(id).await?;
        let recipient = self
            .recipient(order.user_id)
            .await
            .map_err(|e| OrderError::UnknownUser(e.to_string()))?;
        let event = OrderEvent::DeliveryFailed {
            reason: reason.into(),
        };
        Ok(self.dispatcher.dispatch(&event, &order, &recipient).await)
    }

    async fn announce(&self, outcome: TransitionOutcome) -> Notified<Order> {
        let notification = match outcome.change() {
            Some((from, to)) => {
                info!(order_id = %outcome.order().id, %from, %to, "Order status changed");
                self.notify(OrderEvent::StatusChanged { from, to }, outcome.order())
                    .await
            }
            None => NotificationStatus::NotRequired,
        };
        Notified {
            value: outcome.into_order(),
            notification,
        }
    }

    async fn notify(&self, event: OrderEvent, order: &Order) -> NotificationStatus {
        let recipient = match self.recipient(order.user_id).await {
            Ok(recipient) => recipient,
            Err(e) => {
                warn!(order_id = %order.id, error = %e, "Cannot notify, recipient unavailable");
                return NotificationStatus::RecipientUnavailable(e.to_string());
            }
        };

        if let Some(queue) = &self.queue {
            let job = NotificationJob {
                event: event.clone(),
                order: order.clone(),
                recipient: recipient.clone(),
            };
            match queue.try_enqueue(job) {
                Ok(()) => return NotificationStatus::Queued,
                Err(QueueError::Full) => {
                    warn!(order_id = %order.id, event = event.kind(), "Notification queue full, dispatching inline")
                }
                Err(QueueError::Closed) => {
                    warn!(order_id = %order.id, event = event.kind(), "Notification queue closed, dispatching inline")
                }
            }
        }

        NotificationStatus::Delivered(self.dispatcher.dispatch(&event, order, &recipient).await)
    }

    async fn recipient(&self, user_id: UserId) -> Result<Recipient, UserError> {
        let (contact, preferences) = tokio::try_join!(
            self.users.contact_info(user_id),
            self.users.preferences(user_id)
        )?;
        Ok(Recipient::new(user_id, contact, preferences))
    }
}
