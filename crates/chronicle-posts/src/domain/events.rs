//! Domain events for the Posts context.

use chrono::{DateTime, Utc};
use chronicle_core::event::{DomainEvent, EventPayload};
use serde::{Deserialize, Serialize};

/// Type tag of [`PostPublished`].
pub const POST_PUBLISHED_EVENT_TYPE: &str = "post.published";
/// Type tag of [`PostReworded`].
pub const POST_REWORDED_EVENT_TYPE: &str = "posts.reworded";
/// Type tag of [`PostCommented`].
pub const POST_COMMENTED_EVENT_TYPE: &str = "post.commented";
/// Type tag of [`CommentAuthenticated`].
pub const COMMENT_AUTHENTICATED_EVENT_TYPE: &str = "post.comment_authenticated";

/// Emitted when a new post is published.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostPublished {
    /// The newly generated post identifier.
    pub post_id: String,
    /// The trimmed, unique title.
    pub title: String,
    /// The trimmed content.
    pub content: String,
    /// When the post was published.
    pub published_at: DateTime<Utc>,
}

/// Emitted when the content of a post is replaced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostReworded {
    /// The post identifier.
    pub post_id: String,
    /// The new content.
    pub content: String,
    /// Optional human-readable reason for the change.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// When the post was reworded.
    pub reworded_at: DateTime<Utc>,
}

/// Emitted when a reader comments on a post. The comment starts out
/// unauthenticated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostCommented {
    /// The post commented on.
    pub post_id: String,
    /// The newly generated comment identifier.
    pub comment_id: String,
    /// Name of the comment author.
    pub author: String,
    /// Email address the authentication link is sent to.
    pub email: String,
    /// The comment text.
    pub content: String,
    /// When the comment was made.
    pub commented_at: DateTime<Utc>,
}

/// Emitted when the author of a comment confirms it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentAuthenticated {
    /// The post the comment belongs to.
    pub post_id: String,
    /// The authenticated comment.
    pub comment_id: String,
    /// When the comment was authenticated.
    pub authenticated_at: DateTime<Utc>,
}

impl EventPayload for PostPublished {
    const TAG: &'static str = POST_PUBLISHED_EVENT_TYPE;
}

impl EventPayload for PostReworded {
    const TAG: &'static str = POST_REWORDED_EVENT_TYPE;
}

impl EventPayload for PostCommented {
    const TAG: &'static str = POST_COMMENTED_EVENT_TYPE;
}

impl EventPayload for CommentAuthenticated {
    const TAG: &'static str = COMMENT_AUTHENTICATED_EVENT_TYPE;
}

/// Event variants for the Posts context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostEvent {
    /// A post has been published.
    Published(PostPublished),
    /// A post's content has been replaced.
    Reworded(PostReworded),
    /// A comment has been made on a post.
    Commented(PostCommented),
    /// A comment has been authenticated by its author.
    CommentAuthenticated(CommentAuthenticated),
}

impl From<PostPublished> for PostEvent {
    fn from(event: PostPublished) -> Self {
        Self::Published(event)
    }
}

impl From<PostReworded> for PostEvent {
    fn from(event: PostReworded) -> Self {
        Self::Reworded(event)
    }
}

impl From<PostCommented> for PostEvent {
    fn from(event: PostCommented) -> Self {
        Self::Commented(event)
    }
}

impl From<CommentAuthenticated> for PostEvent {
    fn from(event: CommentAuthenticated) -> Self {
        Self::CommentAuthenticated(event)
    }
}

impl DomainEvent for PostEvent {
    fn tag(&self) -> &'static str {
        match self {
            Self::Published(_) => POST_PUBLISHED_EVENT_TYPE,
            Self::Reworded(_) => POST_REWORDED_EVENT_TYPE,
            Self::Commented(_) => POST_COMMENTED_EVENT_TYPE,
            Self::CommentAuthenticated(_) => COMMENT_AUTHENTICATED_EVENT_TYPE,
        }
    }

    fn aggregate_id(&self) -> &str {
        match self {
            Self::Published(e) => &e.post_id,
            Self::Reworded(e) => &e.post_id,
            Self::Commented(e) => &e.post_id,
            Self::CommentAuthenticated(e) => &e.post_id,
        }
    }

    fn to_payload(&self) -> Result<serde_json::Value, serde_json::Error> {
        match self {
            Self::Published(e) => serde_json::to_value(e),
            Self::Reworded(e) => serde_json::to_value(e),
            Self::Commented(e) => serde_json::to_value(e),
            Self::CommentAuthenticated(e) => serde_json::to_value(e),
        }
    }
}
