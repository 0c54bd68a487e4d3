//! Routes for comment authentication.

use axum::extract::{Path, State};
use axum::{Json, Router, routing::post};
use chronicle_posts::domain::commands::AuthenticateComment;
use tracing::{info, instrument};

use crate::error::ApiError;
use crate::routes::posts::CommandResponse;
use crate::state::AppState;

/// POST /{id}/authenticate
///
/// Target of the link mailed to the comment's author.
#[instrument(skip(state))]
async fn authenticate_comment(
    State(state): State<AppState>,
    Path(comment_id): Path<String>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = AuthenticateComment {
        comment_id: comment_id.clone(),
    };

    let events = state.blog.handle_command(command.into()).await?;
    info!("comment authenticated");

    Ok(Json(CommandResponse::new(comment_id, &events)))
}

/// Returns the router for comments.
pub fn router() -> Router<AppState> {
    Router::new().route("/{id}/authenticate", post(authenticate_comment))
}
