//! Command handlers for the Posts context.
//!
//! This module contains application-level command handler functions that
//! resolve the target post, reconstitute it from its stream and let it decide
//! which events the command produces. Committing those events is left to the
//! orchestrator.

use chronicle_core::aggregate::{AggregateRoot, CommandContext, Decision};
use chronicle_core::error::DomainError;
use chronicle_core::store::EventStore;

use crate::domain::aggregates::Post;
use crate::domain::commands::{
    AuthenticateComment, CommentOnPost, PostCommand, PublishPost, RewordPost,
};
use crate::domain::events::PostEvent;
use crate::domain::index::PostIndex;

/// Reconstitutes a `Post` from its stream.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if the stream was never written and
/// `DomainError::Storage` if it cannot be read.
pub(crate) async fn reconstitute(
    post_id: &str,
    store: &dyn EventStore<PostEvent>,
) -> Result<Post, DomainError> {
    let events = store.load_stream(post_id).await?;
    Ok(Post::replay(&events))
}

/// Handles the `PublishPost` command against a fresh aggregate.
#[must_use]
pub fn handle_publish_post(
    command: &PublishPost,
    index: &PostIndex,
    ctx: &CommandContext<'_>,
) -> Decision<PostEvent> {
    Post::default().publish(command, index, ctx)
}

/// Handles the `RewordPost` command: reconstitutes the post and rewords it.
///
/// # Errors
///
/// Returns `DomainError` if the post's stream cannot be loaded.
pub async fn handle_reword_post(
    command: &RewordPost,
    store: &dyn EventStore<PostEvent>,
    ctx: &CommandContext<'_>,
) -> Result<Decision<PostEvent>, DomainError> {
    let post = reconstitute(&command.post_id, store).await?;
    Ok(post.reword(command, ctx))
}

/// Handles the `CommentOnPost` command: reconstitutes the post and records the
/// comment.
///
/// # Errors
///
/// Returns `DomainError` if the post's stream cannot be loaded.
pub async fn handle_comment_on_post(
    command: &CommentOnPost,
    store: &dyn EventStore<PostEvent>,
    ctx: &CommandContext<'_>,
) -> Result<Decision<PostEvent>, DomainError> {
    let post = reconstitute(&command.post_id, store).await?;
    Ok(post.comment(command, ctx))
}

/// Handles the `AuthenticateComment` command: finds the owning post through
/// the index, reconstitutes it and authenticates the comment.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if no post holds the comment, or any error
/// from loading the post's stream.
pub async fn handle_authenticate_comment(
    command: &AuthenticateComment,
    store: &dyn EventStore<PostEvent>,
    index: &PostIndex,
    ctx: &CommandContext<'_>,
) -> Result<Decision<PostEvent>, DomainError> {
    let post_id = index
        .post_for_comment(&command.comment_id)
        .ok_or_else(|| DomainError::NotFound(command.comment_id.clone()))?;
    let post = reconstitute(post_id, store).await?;
    Ok(post.authenticate_comment(command, ctx))
}

/// Routes a command to its handler.
///
/// # Errors
///
/// Returns `DomainError` if the target post cannot be resolved or loaded.
pub async fn decide(
    command: &PostCommand,
    store: &dyn EventStore<PostEvent>,
    index: &PostIndex,
    ctx: &CommandContext<'_>,
) -> Result<Decision<PostEvent>, DomainError> {
    match command {
        PostCommand::Publish(c) => Ok(handle_publish_post(c, index, ctx)),
        PostCommand::Reword(c) => handle_reword_post(c, store, ctx).await,
        PostCommand::Comment(c) => handle_comment_on_post(c, store, ctx).await,
        PostCommand::AuthenticateComment(c) => {
            handle_authenticate_comment(c, store, index, ctx).await
        }
    }
}
