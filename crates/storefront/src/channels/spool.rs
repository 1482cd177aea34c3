//! Durable last resort for email: one JSON file per message in a spool directory.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use tracing::warn;
use uuid::Uuid;

use super::OutgoingEmail;

/// A message that no provider accepted, kept for later replay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpooledEmail {
    pub id: Uuid,
    pub queued_at: DateTime<Utc>,
    pub reason: String,
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Clone)]
pub struct MailSpool {
    dir: PathBuf,
}

impl MailSpool {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write the message and return the file it landed in. The file appears complete or not at
    /// all.
    pub async fn write(&self, email: &OutgoingEmail, reason: &str) -> io::Result<PathBuf> {
        let entry = SpooledEmail {
            id: Uuid::new_v4(),
            queued_at: Utc::now(),
            reason: reason.to_string(),
            from: email.from.clone(),
            to: email.to.clone(),
            subject: email.subject.clone(),
            body: email.body.clone(),
        };
        let json = serde_json::to_vec_pretty(&entry).map_err(io::Error::other)?;

        tokio::fs::create_dir_all(&self.dir).await?;
        let file_name = format!("{}-{}.json", entry.queued_at.format("%Y%m%dT%H%M%S"), entry.id);
        let path = self.dir.join(&file_name);
        // Readers only pick up `.json`, so a write cut short never shows up as a message.
        let partial = self.dir.join(format!("{file_name}.part"));
        tokio::fs::write(&partial, json).await?;
        tokio::fs::rename(&partial, &path).await?;

        warn!(to = %entry.to, path = %path.display(), %reason, "Email spooled");
        Ok(path)
    }

    /// Everything currently waiting in the spool, oldest first.
    pub async fn pending(&self) -> io::Result<Vec<SpooledEmail>> {
        let mut entries = Vec::new();
        let mut dir = match tokio::fs::read_dir(&self.dir).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(entries),
            Err(e) => return Err(e),
        };
        while let Some(item) = dir.next_entry().await? {
            if item.path().extension().is_some_and(|ext| ext == "json") {
                let bytes = tokio::fs::read(item.path()).await?;
                let entry: SpooledEmail =
                    serde_json::from_slice(&bytes).map_err(io::Error::other)?;
                entries.push(entry);
            }
        }
        entries.sort_by_key(|e| e.queued_at);
        Ok(entries)
    }
}
