//! Append-only audit trail of notification dispatches.

use super::{NotificationAttempt, SkippedChannel};
use crate::model::{OrderId, UserId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Mutex;
use tracing::info;
use uuid::Uuid;

/// One entry per dispatch: which channels were tried or skipped, and how they ended.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityLogEntry {
    pub id: Uuid,
    pub recorded_at: DateTime<Utc>,
    pub order_id: OrderId,
    pub user_id: UserId,
    pub event: &'static str,
    pub success: bool,
    pub attempts: Vec<NotificationAttempt>,
    pub skipped: Vec<SkippedChannel>,
}

#[derive(Debug, thiserror::Error)]
pub enum ActivityLogError {
    #[error("Failed to encode activity entry: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("Activity log unavailable: {0}")]
    Unavailable(String),
}

/// Write-only sink. Callers log and drop failures; an audit problem never fails a dispatch.
#[async_trait]
pub trait ActivityLogSink: Send + Sync {
    async fn append(&self, entry: ActivityLogEntry) -> Result<(), ActivityLogError>;
}

/// Emits each entry as a structured `tracing` event.
#[derive(Debug, Default)]
pub struct TracingActivityLog;

#[async_trait]
impl ActivityLogSink for TracingActivityLog {
    async fn append(&self, entry: ActivityLogEntry) -> Result<(), ActivityLogError> {
        let detail = serde_json::to_string(&entry)?;
        info!(
            target: "activity",
            order_id = %entry.order_id,
            event = entry.event,
            success = entry.success,
            %detail,
            "Notification dispatched"
        );
        Ok(())
    }
}

/// Keeps entries in memory; used by tests and the demo binary.
#[derive(Debug, Default)]
pub struct InMemoryActivityLog {
    entries: Mutex<Vec<ActivityLogEntry>>,
}

impl InMemoryActivityLog {
    pub fn entries(&self) -> Vec<ActivityLogEntry> {
        match self.entries.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[async_trait]
impl ActivityLogSink for InMemoryActivityLog {
    async fn append(&self, entry: ActivityLogEntry) -> Result<(), ActivityLogError> {
        self.entries
            .lock()
            .map_err(|e| ActivityLogError::Unavailable(e.to_string()))?
            .push(entry);
        Ok(())
    }
}
