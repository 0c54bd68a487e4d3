//! Outbox mailer: writes each outgoing mail to a directory for an external
//! delivery agent to pick up.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use chronicle_event_store::layout::{key_name, next_key};
use chronicle_posts::application::processors::{MailMessage, Mailer, ProcessorError};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::info;

/// Mailer storing every message as a pretty-printed JSON file named by a
/// nanosecond timestamp.
#[derive(Debug)]
pub struct OutboxMailer {
    dir: PathBuf,
    last_key: Mutex<u64>,
}

impl OutboxMailer {
    /// Creates a mailer writing into `dir`, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the directory cannot be created.
    pub async fn open(dir: impl Into<PathBuf>) -> std::io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await?;
        Ok(Self {
            dir,
            last_key: Mutex::new(0),
        })
    }

    /// The outbox directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl Mailer for OutboxMailer {
    async fn send(&self, message: &MailMessage) -> Result<(), ProcessorError> {
        let data = serde_json::to_vec_pretty(message)
            .map_err(|e| ProcessorError::Delivery(e.to_string()))?;

        let mut last_key = self.last_key.lock().await;
        let key = next_key(*last_key, Utc::now());
        let path = self.dir.join(format!("{}.json", key_name(key)));
        fs::write(&path, data)
            .await
            .map_err(|e| ProcessorError::Delivery(format!("{}: {e}", path.display())))?;
        *last_key = key;

        info!(to = ?message.to, path = %path.display(), "mail queued in outbox");
        Ok(())
    }
}
