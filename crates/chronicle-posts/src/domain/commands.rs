//! Commands for the Posts context.

use chronicle_core::command::Command;

/// Command to publish a new post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishPost {
    /// The title; must be unique across all posts.
    pub title: String,
    /// The post body.
    pub content: String,
}

impl Command for PublishPost {
    fn command_type(&self) -> &'static str {
        "posts.publish_post"
    }

    fn sanitize(&mut self) {
        trim_in_place(&mut self.title);
        trim_in_place(&mut self.content);
    }
}

/// Command to replace the content of an existing post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewordPost {
    /// The post identifier.
    pub post_id: String,
    /// The replacement content.
    pub new_content: String,
    /// Optional reason for the change; blank reasons are dropped.
    pub reason: Option<String>,
}

impl Command for RewordPost {
    fn command_type(&self) -> &'static str {
        "posts.reword_post"
    }

    fn sanitize(&mut self) {
        trim_in_place(&mut self.post_id);
        trim_in_place(&mut self.new_content);
        self.reason = self
            .reason
            .take()
            .map(|reason| reason.trim().to_owned())
            .filter(|reason| !reason.is_empty());
    }
}

/// Command to comment on a published post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentOnPost {
    /// The post identifier.
    pub post_id: String,
    /// Name of the author.
    pub author: String,
    /// Email address the authentication link is sent to.
    pub email: String,
    /// The comment text.
    pub content: String,
}

impl Command for CommentOnPost {
    fn command_type(&self) -> &'static str {
        "posts.comment_on_post"
    }

    fn sanitize(&mut self) {
        trim_in_place(&mut self.post_id);
        trim_in_place(&mut self.author);
        trim_in_place(&mut self.email);
        trim_in_place(&mut self.content);
    }
}

/// Command to authenticate a comment via the link sent to its author.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticateComment {
    /// The comment identifier.
    pub comment_id: String,
}

impl Command for AuthenticateComment {
    fn command_type(&self) -> &'static str {
        "posts.authenticate_comment"
    }

    fn sanitize(&mut self) {
        trim_in_place(&mut self.comment_id);
    }
}

/// Every command the `Post` aggregate accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostCommand {
    /// Publish a new post.
    Publish(PublishPost),
    /// Replace a post's content.
    Reword(RewordPost),
    /// Comment on a post.
    Comment(CommentOnPost),
    /// Authenticate a comment.
    AuthenticateComment(AuthenticateComment),
}

impl Command for PostCommand {
    fn command_type(&self) -> &'static str {
        match self {
            Self::Publish(c) => c.command_type(),
            Self::Reword(c) => c.command_type(),
            Self::Comment(c) => c.command_type(),
            Self::AuthenticateComment(c) => c.command_type(),
        }
    }

    fn sanitize(&mut self) {
        match self {
            Self::Publish(c) => c.sanitize(),
            Self::Reword(c) => c.sanitize(),
            Self::Comment(c) => c.sanitize(),
            Self::AuthenticateComment(c) => c.sanitize(),
        }
    }
}

impl From<PublishPost> for PostCommand {
    fn from(command: PublishPost) -> Self {
        Self::Publish(command)
    }
}

impl From<RewordPost> for PostCommand {
    fn from(command: RewordPost) -> Self {
        Self::Reword(command)
    }
}

impl From<CommentOnPost> for PostCommand {
    fn from(command: CommentOnPost) -> Self {
        Self::Comment(command)
    }
}

impl From<AuthenticateComment> for PostCommand {
    fn from(command: AuthenticateComment) -> Self {
        Self::AuthenticateComment(command)
    }
}

fn trim_in_place(value: &mut String) {
    let trimmed = value.trim();
    if trimmed.len() != value.len() {
        *value = trimmed.to_owned();
    }
}
