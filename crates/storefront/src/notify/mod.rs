//! # Notification Pipeline
//!
//! Fans an order event out to every channel the customer opted into, in parallel, and
//! records one audit entry per dispatch.
//!
//! ## Channel Selection
//!
//! | Channel | Attempted when |
//! |---------|----------------|
//! | Email | `email_notifications` is on (a missing address then fails that channel) |
//! | SMS | `sms_notifications` is on and a phone is known (profile, else shipping address) |
//! | WhatsApp | `whatsapp_notifications` is on and a phone is known |
//!
//! Status-change events are skipped entirely when `order_updates` is off.
//!
//! ## Failure Isolation
//!
//! Each channel runs in its own task under `channel_timeout`. A slow or failing channel never
//! holds up the others, and [`NotificationDispatcher::dispatch`] never returns an error: a
//! dispatch where nothing got through reports `success: false`.

pub mod activity_log;
pub mod dispatcher;
pub mod event;
pub mod queue;
pub mod render;

pub use activity_log::*;
pub use dispatcher::*;
pub use event::*;
pub use queue::*;

use crate::channels::{Channel, DeliveryResult, DeliveryStatus, ErrorClass};
use crate::model::{ContactInfo, NotificationPreferences, OrderId, UserId};
use serde::Serialize;

/// Who to notify and how they want to hear from us.
#[derive(Debug, Clone, PartialEq)]
pub struct Recipient {
    pub user_id: UserId,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub preferences: NotificationPreferences,
}

impl Recipient {
    pub fn new(user_id: UserId, contact: ContactInfo, preferences: NotificationPreferences) -> Self {
        Self {
            user_id,
            name: contact.name,
            email: contact.email,
            phone: contact.phone,
            preferences,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AttemptOutcome {
    Success,
    Simulated,
    /// Providers failed but the message was persisted locally.
    Spooled,
    Failure,
}

impl AttemptOutcome {
    /// Counts towards the dispatch's `success`.
    pub fn is_delivered(self) -> bool {
        matches!(self, AttemptOutcome::Success | AttemptOutcome::Simulated)
    }
}

impl From<DeliveryStatus> for AttemptOutcome {
    fn from(status: DeliveryStatus) -> Self {
        match status {
            DeliveryStatus::Sent => AttemptOutcome::Success,
            DeliveryStatus::Simulated => AttemptOutcome::Simulated,
            DeliveryStatus::Spooled => AttemptOutcome::Spooled,
        }
    }
}

/// Outcome of one channel within one dispatch. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotificationAttempt {
    pub channel: Channel,
    pub order_id: OrderId,
    pub user_id: UserId,
    /// Provider calls made on this channel.
    pub attempt: u32,
    pub outcome: AttemptOutcome,
    pub provider: Option<String>,
    pub error: Option<ErrorClass>,
    pub detail: Option<String>,
}

impl NotificationAttempt {
    pub(crate) fn delivered(order_id: OrderId, user_id: UserId, result: DeliveryResult) -> Self {
        Self {
            channel: result.channel,
            order_id,
            user_id,
            attempt: result.attempts,
            outcome: result.status.into(),
            provider: Some(result.provider),
            error: None,
            detail: result.message_id,
        }
    }

    pub(crate) fn failed(
        channel: Channel,
        order_id: OrderId,
        user_id: UserId,
        attempt: u32,
        error: ErrorClass,
        detail: String,
    ) -> Self {
        Self {
            channel,
            order_id,
            user_id,
            attempt,
            outcome: AttemptOutcome::Failure,
            provider: None,
            error: Some(error),
            detail: Some(detail),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The user switched the channel off.
    Disabled,
    /// SMS/WhatsApp with no phone on the profile or the shipping address.
    NoPhone,
    /// A status update for a user who turned order updates off.
    OrderUpdatesOff,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SkippedChannel {
    pub channel: Channel,
    pub reason: SkipReason,
}

/// Aggregate outcome of a dispatch. `success` is true when at least one channel delivered.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotificationDispatchResult {
    pub success: bool,
    pub attempts: Vec<NotificationAttempt>,
    pub skipped: Vec<SkippedChannel>,
}

impl NotificationDispatchResult {
    pub fn attempt(&self, channel: Channel) -> Option<&NotificationAttempt> {
        self.attempts.iter().find(|a| a.channel == channel)
    }
}
