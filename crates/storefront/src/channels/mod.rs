//! # Channel Senders
//!
//! Leaf components that put one rendered message on one delivery channel.
//!
//! | Channel | Sender | Failure handling |
//! |---------|--------|------------------|
//! | Email | [`EmailSender`] | primary relay with retry, then sandbox relay, then local spool |
//! | SMS | [`MessagingSender`] | retry; simulated when no credentials are configured |
//! | WhatsApp | [`MessagingSender`] | same as SMS, `whatsapp:` addressing |
//!
//! Providers sit behind [`EmailTransport`] and [`MessagingProvider`] so they are built once at
//! startup and can be replaced by fakes. All senders share
//! [`resource_actor::retry`] for attempt counting and backoff, and classify failures into
//! [`DeliveryError`].

pub mod email;
pub mod error;
pub mod messaging;
pub mod phone;
pub mod spool;

pub use email::*;
pub use error::*;
pub use messaging::*;
pub use phone::normalize_phone;
pub use spool::*;

use async_trait::async_trait;
use futures::future::{BoxFuture, Shared};
use futures::FutureExt;
use resource_actor::retry::Attempted;
use serde::Serialize;
use std::fmt::Display;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Email,
    Sms,
    WhatsApp,
}

impl Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Channel::Email => f.write_str("email"),
            Channel::Sms => f.write_str("sms"),
            Channel::WhatsApp => f.write_str("whatsapp"),
        }
    }
}

/// Text ready to send. `subject` is only used by email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    pub subject: Option<String>,
    pub body: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    /// Accepted by a real provider.
    Sent,
    /// No provider configured; nothing left the process.
    Simulated,
    /// Every provider failed; the message was written to the local spool for later replay.
    Spooled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryResult {
    pub channel: Channel,
    pub provider: String,
    pub destination: String,
    pub status: DeliveryStatus,
    pub message_id: Option<String>,
    /// Provider calls made, across every step of a fallback chain.
    pub attempts: u32,
}

/// Failure of a sender, with the number of provider calls spent on it.
pub type DeliveryFailure = Attempted<DeliveryError>;

/// A spool write running on its own task. Every clone resolves to the same file.
pub(crate) type SpoolWrite = Shared<BoxFuture<'static, Result<PathBuf, String>>>;

/// What one send has done so far. Outlives the send future, so a send that was cut off at the
/// dispatch deadline can still be accounted for.
#[derive(Default)]
pub struct SendProgress {
    attempts: AtomicU32,
    spool_write: Mutex<Option<SpoolWrite>>,
}

impl SendProgress {
    pub fn record_attempt(&self) {
        self.attempts.fetch_add(1, Ordering::SeqCst);
    }

    /// Provider calls started so far.
    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }

    /// The spool write already in flight for this send, or a new one from `start`.
    pub(crate) fn spool_write(&self, start: impl FnOnce() -> SpoolWrite) -> SpoolWrite {
        let mut slot = self
            .spool_write
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        slot.get_or_insert_with(start).clone()
    }
}

/// Run `write` on its own task, so dropping the caller never leaves a half-written spool file.
pub(crate) fn spawn_spool_write<F>(write: F) -> SpoolWrite
where
    F: std::future::Future<Output = std::io::Result<PathBuf>> + Send + 'static,
{
    let task = tokio::spawn(write);
    async move {
        match task.await {
            Ok(written) => written.map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        }
    }
    .boxed()
    .shared()
}

#[async_trait]
pub trait ChannelSender: Send + Sync {
    fn channel(&self) -> Channel;

    async fn send(
        &self,
        destination: &str,
        message: &RenderedMessage,
    ) -> Result<DeliveryResult, DeliveryFailure>;

    /// [`send`](Self::send), reporting provider calls and spool writes into `progress` as
    /// they happen. Used by the dispatcher, which may drop the future at its deadline.
    async fn send_tracked(
        &self,
        destination: &str,
        message: &RenderedMessage,
        _progress: &SendProgress,
    ) -> Result<DeliveryResult, DeliveryFailure> {
        self.send(destination, message).await
    }

    /// Called when [`send_tracked`](Self::send_tracked) missed the dispatch deadline. Senders
    /// that must never lose a message persist it here; the default abandons it.
    async fn on_deadline(
        &self,
        _destination: &str,
        _message: &RenderedMessage,
        _progress: &SendProgress,
    ) -> Option<DeliveryResult> {
        None
    }
}

/// A failure that happened before any provider was called.
pub(crate) fn local_failure(error: DeliveryError) -> DeliveryFailure {
    Attempted {
        value: error,
        attempts: 0,
    }
}
