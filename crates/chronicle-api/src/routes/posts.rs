//! Routes for publishing, rewording, commenting on and reading posts.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chronicle_core::event::{DomainEvent, Events};
use chronicle_posts::application::views::PostView;
use chronicle_posts::domain::commands::{CommentOnPost, PublishPost, RewordPost};
use chronicle_posts::domain::events::PostEvent;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /.
#[derive(Debug, Deserialize)]
pub struct PublishPostRequest {
    /// The title; must be unique.
    pub title: String,
    /// The post body.
    pub content: String,
}

/// Request body for POST /{id}/reword.
#[derive(Debug, Deserialize)]
pub struct RewordPostRequest {
    /// The replacement content.
    pub content: String,
    /// Optional reason for the change.
    #[serde(default)]
    pub reason: Option<String>,
}

/// Request body for POST /{id}/comments.
#[derive(Debug, Deserialize)]
pub struct CommentOnPostRequest {
    /// Name of the author.
    pub author: String,
    /// Address the authentication link is sent to.
    pub email: String,
    /// The comment text.
    pub content: String,
}

/// Response body returned after a command is successfully handled.
#[derive(Debug, Serialize)]
pub struct CommandResponse {
    /// The post or comment the command created or changed.
    pub id: String,
    /// Type tags of the events committed, in order.
    pub event_types: Vec<&'static str>,
}

impl CommandResponse {
    pub(crate) fn new(id: impl Into<String>, events: &Events<PostEvent>) -> Self {
        Self {
            id: id.into(),
            event_types: events.iter().map(DomainEvent::tag).collect(),
        }
    }
}

/// POST /
#[instrument(skip(state, request))]
async fn publish_post(
    State(state): State<AppState>,
    Json(request): Json<PublishPostRequest>,
) -> Result<(StatusCode, Json<CommandResponse>), ApiError> {
    let command = PublishPost {
        title: request.title,
        content: request.content,
    };

    let events = state.blog.handle_command(command.into()).await?;

    let post_id = events
        .iter()
        .find_map(|event| match event {
            PostEvent::Published(e) => Some(e.post_id.clone()),
            _ => None,
        })
        .unwrap_or_default();
    info!(%post_id, "post published");

    Ok((
        StatusCode::CREATED,
        Json(CommandResponse::new(post_id, &events)),
    ))
}

/// GET /
#[instrument(skip(state))]
async fn list_posts(State(state): State<AppState>) -> Json<Vec<PostView>> {
    Json(state.blog.posts().await)
}

/// GET /{id}
#[instrument(skip(state))]
async fn get_post(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> Result<Json<PostView>, ApiError> {
    let view = state.blog.post(&post_id).await?;
    Ok(Json(view))
}

/// POST /{id}/reword
#[instrument(skip(state, request))]
async fn reword_post(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    Json(request): Json<RewordPostRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = RewordPost {
        post_id: post_id.clone(),
        new_content: request.content,
        reason: request.reason,
    };

    let events = state.blog.handle_command(command.into()).await?;

    Ok(Json(CommandResponse::new(post_id, &events)))
}

/// POST /{id}/comments
#[instrument(skip(state, request))]
async fn comment_on_post(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    Json(request): Json<CommentOnPostRequest>,
) -> Result<(StatusCode, Json<CommandResponse>), ApiError> {
    let command = CommentOnPost {
        post_id,
        author: request.author,
        email: request.email,
        content: request.content,
    };

    let events = state.blog.handle_command(command.into()).await?;

    let comment_id = events
        .iter()
        .find_map(|event| match event {
            PostEvent::Commented(e) => Some(e.comment_id.clone()),
            _ => None,
        })
        .unwrap_or_default();
    info!(%comment_id, "comment awaiting authentication");

    Ok((
        StatusCode::ACCEPTED,
        Json(CommandResponse::new(comment_id, &events)),
    ))
}

/// Returns the router for posts.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(publish_post).get(list_posts))
        .route("/{id}", get(get_post))
        .route("/{id}/reword", post(reword_post))
        .route("/{id}/comments", post(comment_on_post))
}
