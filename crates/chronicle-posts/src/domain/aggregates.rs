//! Aggregate roots for the Posts context.

use std::collections::BTreeMap;

use chronicle_core::aggregate::{AggregateRoot, CommandContext, Decision};
use chronicle_core::event::Events;
use chronicle_core::validation::{ValidationError, Violation};

use super::commands::{AuthenticateComment, CommentOnPost, PostCommand, PublishPost, RewordPost};
use super::events::{CommentAuthenticated, PostCommented, PostEvent, PostPublished, PostReworded};
use super::index::PostIndex;

/// Field name of a post title in validation errors.
pub const TITLE_FIELD: &str = "Title";
/// Field name of post or comment content in validation errors.
pub const CONTENT_FIELD: &str = "Content";
/// Field name of a comment author in validation errors.
pub const AUTHOR_FIELD: &str = "Author";
/// Field name of a comment author's email in validation errors.
pub const EMAIL_FIELD: &str = "Email";
/// Field name used when the targeted post does not exist.
pub const POST_FIELD: &str = "Post";
/// Field name used when the targeted comment is missing or already confirmed.
pub const COMMENT_FIELD: &str = "Comment";

/// A comment as far as the aggregate needs to know it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostComment {
    /// Comment identifier.
    pub id: String,
    /// Whether the author has confirmed the comment.
    pub authenticated: bool,
}

/// The aggregate root for a blog post and its comments.
#[derive(Debug, Clone, Default)]
pub struct Post {
    /// Aggregate identifier; `None` until a `PostPublished` event is applied.
    pub(crate) id: Option<String>,
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) comments: BTreeMap<String, PostComment>,
    /// Current version (event count).
    pub(crate) version: i64,
}

impl Post {
    /// The published title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// The current content.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Looks up a comment by id.
    #[must_use]
    pub fn find_comment(&self, comment_id: &str) -> Option<&PostComment> {
        self.comments.get(comment_id)
    }

    /// Whether this post has been published.
    #[must_use]
    pub fn is_published(&self) -> bool {
        self.id.is_some()
    }

    /// Publishes a post with a fresh identity.
    ///
    /// Title and content must be non-empty and the title must not be used by
    /// any published post.
    #[must_use]
    pub fn publish(
        &self,
        command: &PublishPost,
        index: &PostIndex,
        ctx: &CommandContext<'_>,
    ) -> Decision<PostEvent> {
        let title = command.title.trim();
        let content = command.content.trim();

        let mut verr = ValidationError::new();
        if title.is_empty() {
            verr.add(TITLE_FIELD, Violation::Empty);
        }
        if content.is_empty() {
            verr.add(CONTENT_FIELD, Violation::Empty);
        }
        if !index.is_title_unique(title) {
            verr.add(TITLE_FIELD, Violation::NotUnique);
        }
        if !verr.is_empty() {
            return Decision::reject(verr);
        }

        Decision::accept(Events::single(PostEvent::Published(PostPublished {
            post_id: ctx.ids.next_id(),
            title: title.to_owned(),
            content: content.to_owned(),
            published_at: ctx.clock.now(),
        })))
    }

    /// Replaces the post's content. Rewording to the current content is a
    /// no-op and emits nothing.
    #[must_use]
    pub fn reword(&self, command: &RewordPost, ctx: &CommandContext<'_>) -> Decision<PostEvent> {
        let new_content = command.new_content.trim();

        let mut verr = ValidationError::new();
        let Some(post_id) = &self.id else {
            verr.add(POST_FIELD, Violation::NotFound);
            return Decision::reject(verr);
        };
        if new_content.is_empty() {
            verr.add(CONTENT_FIELD, Violation::Empty);
            return Decision::reject(verr);
        }
        if new_content == self.content {
            return Decision::unchanged();
        }

        Decision::accept(Events::single(PostEvent::Reworded(PostReworded {
            post_id: post_id.clone(),
            content: new_content.to_owned(),
            reason: command.reason.clone(),
            reworded_at: ctx.clock.now(),
        })))
    }

    /// Records a new, unauthenticated comment.
    ///
    /// The event is emitted even when validation fails; callers must not
    /// commit it unless the decision is valid.
    #[must_use]
    pub fn comment(&self, command: &CommentOnPost, ctx: &CommandContext<'_>) -> Decision<PostEvent> {
        let mut verr = ValidationError::new();
        if command.content.trim().is_empty() {
            verr.add(CONTENT_FIELD, Violation::Empty);
        }
        if command.author.trim().is_empty() {
            verr.add(AUTHOR_FIELD, Violation::Empty);
        }
        if command.email.trim().is_empty() {
            verr.add(EMAIL_FIELD, Violation::Empty);
        }
        let post_id = if let Some(id) = &self.id {
            id.clone()
        } else {
            verr.add(POST_FIELD, Violation::NotFound);
            command.post_id.trim().to_owned()
        };

        let event = PostEvent::Commented(PostCommented {
            post_id,
            comment_id: ctx.ids.next_id(),
            author: command.author.trim().to_owned(),
            email: command.email.trim().to_owned(),
            content: command.content.trim().to_owned(),
            commented_at: ctx.clock.now(),
        });
        Decision::flagged(Events::single(event), verr)
    }

    /// Marks a comment as authenticated.
    ///
    /// Like [`Post::comment`], the event is emitted alongside any violation.
    #[must_use]
    pub fn authenticate_comment(
        &self,
        command: &AuthenticateComment,
        ctx: &CommandContext<'_>,
    ) -> Decision<PostEvent> {
        let comment_id = command.comment_id.trim();

        let mut verr = ValidationError::new();
        match self.comments.get(comment_id) {
            None => {
                verr.add(COMMENT_FIELD, Violation::NotFound);
            }
            Some(comment) if comment.authenticated => {
                verr.add(COMMENT_FIELD, Violation::AlreadyAuthenticated);
            }
            Some(_) => {}
        }
        if self.id.is_none() {
            verr.add(POST_FIELD, Violation::NotFound);
        }

        let event = PostEvent::CommentAuthenticated(CommentAuthenticated {
            post_id: self.id.clone().unwrap_or_default(),
            comment_id: comment_id.to_owned(),
            authenticated_at: ctx.clock.now(),
        });
        Decision::flagged(Events::single(event), verr)
    }
}

impl AggregateRoot for Post {
    type Event = PostEvent;
    type Command = PostCommand;
    type Index = PostIndex;

    fn aggregate_id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn apply(&mut self, event: &Self::Event) {
        match event {
            PostEvent::Published(payload) => {
                self.id = Some(payload.post_id.clone());
                self.title.clone_from(&payload.title);
                self.content.clone_from(&payload.content);
            }
            PostEvent::Reworded(payload) => {
                self.content.clone_from(&payload.content);
            }
            PostEvent::Commented(payload) => {
                self.comments.insert(
                    payload.comment_id.clone(),
                    PostComment {
                        id: payload.comment_id.clone(),
                        authenticated: false,
                    },
                );
            }
            PostEvent::CommentAuthenticated(payload) => {
                if let Some(comment) = self.comments.get_mut(&payload.comment_id) {
                    comment.authenticated = true;
                }
            }
        }
        self.version += 1;
    }

    fn handle(
        &self,
        command: &Self::Command,
        index: &Self::Index,
        ctx: &CommandContext<'_>,
    ) -> Decision<Self::Event> {
        match command {
            PostCommand::Publish(c) => self.publish(c, index, ctx),
            PostCommand::Reword(c) => self.reword(c, ctx),
            PostCommand::Comment(c) => self.comment(c, ctx),
            PostCommand::AuthenticateComment(c) => self.authenticate_comment(c, ctx),
        }
    }
}
