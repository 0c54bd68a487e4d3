//! Processors: side effects triggered by newly committed events.
//!
//! Processors only run for live commands, never while the history is being
//! replayed at start-up.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::application::views::AllPostsView;
use crate::domain::events::{PostCommented, PostEvent};

/// Subject line of the comment authentication mail.
pub const AUTHENTICATION_SUBJECT: &str = "Authenticate your comment";

/// Failure of a processor's side effect.
#[derive(Debug, Error)]
pub enum ProcessorError {
    /// The mail could not be handed off for delivery.
    #[error("mail delivery failed: {0}")]
    Delivery(String),
}

/// Reacts to an event after it has been stored and observed.
#[async_trait]
pub trait Processor: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Handles one committed event with read access to the posts view.
    ///
    /// # Errors
    ///
    /// Returns `ProcessorError` if the side effect failed. The event itself
    /// stays committed.
    async fn process(&self, event: &PostEvent, posts: &AllPostsView) -> Result<(), ProcessorError>;
}

/// An outgoing mail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MailMessage {
    /// Recipient addresses.
    pub to: Vec<String>,
    /// Subject line.
    pub subject: String,
    /// Plain-text body.
    pub body: String,
}

/// Hands mail over for delivery.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Sends `message`.
    ///
    /// # Errors
    ///
    /// Returns `ProcessorError::Delivery` if the message was not accepted.
    async fn send(&self, message: &MailMessage) -> Result<(), ProcessorError>;
}

/// Mails comment authors a link to confirm their comment.
pub struct CommentAuthenticationMailer {
    mailer: Arc<dyn Mailer>,
    base_url: String,
}

impl CommentAuthenticationMailer {
    /// Creates a processor sending links rooted at `base_url`.
    #[must_use]
    pub fn new(mailer: Arc<dyn Mailer>, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            mailer,
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    /// Builds the mail for a new comment on a post titled `title`.
    #[must_use]
    pub fn compose(&self, comment: &PostCommented, title: &str) -> MailMessage {
        let body = format!(
            "Hello {author},\n\n\
             Please authenticate your comment on\n\n    \
             \"{title}\"\n\n\
             By clicking this link:\n\n    \
             {base_url}/comments/{comment_id}\n",
            author = comment.author,
            base_url = self.base_url,
            comment_id = comment.comment_id,
        );
        MailMessage {
            to: vec![comment.email.clone()],
            subject: AUTHENTICATION_SUBJECT.to_owned(),
            body,
        }
    }
}

#[async_trait]
impl Processor for CommentAuthenticationMailer {
    fn name(&self) -> &'static str {
        "comment_authentication_mailer"
    }

    async fn process(&self, event: &PostEvent, posts: &AllPostsView) -> Result<(), ProcessorError> {
        let PostEvent::Commented(comment) = event else {
            return Ok(());
        };
        let title = posts
            .post(&comment.post_id)
            .map_or("", |post| post.title.as_str());

        let message = self.compose(comment, title);
        self.mailer.send(&message).await?;
        debug!(comment_id = %comment.comment_id, "authentication mail sent");
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::{MailMessage, Mailer, ProcessorError};

    /// Mailer that keeps every message in memory.
    #[derive(Debug, Default)]
    pub(crate) struct RecordingMailer {
        sent: Mutex<Vec<MailMessage>>,
        fail: bool,
    }

    impl RecordingMailer {
        pub(crate) fn failing() -> Self {
            Self {
                sent: Mutex::default(),
                fail: true,
            }
        }

        pub(crate) fn sent(&self) -> Vec<MailMessage> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, message: &MailMessage) -> Result<(), ProcessorError> {
            if self.fail {
                return Err(ProcessorError::Delivery("smtp unavailable".to_owned()));
            }
            self.sent.lock().unwrap().push(message.clone());
            Ok(())
        }
    }
}
