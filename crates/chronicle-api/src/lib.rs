//! Chronicle: HTTP API.
//!
//! Wires the file event store, the posts context and the outbox mailer into an
//! axum router. The binary in `main.rs` only reads the configuration and
//! serves what [`build_state`] and [`router`] return.

pub mod config;
pub mod error;
pub mod mailer;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::Router;
use chronicle_core::clock::Clock;
use chronicle_core::error::DomainError;
use chronicle_core::ids::IdGenerator;
use chronicle_event_store::FileEventStore;
use chronicle_posts::application::blog::{Blog, ReadModels};
use chronicle_posts::application::processors::CommentAuthenticationMailer;
use chronicle_posts::domain::events::{
    CommentAuthenticated, PostCommented, PostEvent, PostPublished, PostReworded,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::Config;
use crate::error::AppError;
use crate::mailer::OutboxMailer;
use crate::state::AppState;

/// Registers every post event shape with `store`.
pub fn register_post_events(store: &mut FileEventStore<PostEvent>) {
    store.register::<PostPublished>();
    store.register::<PostReworded>();
    store.register::<PostCommented>();
    store.register::<CommentAuthenticated>();
}

/// Opens the store, rebuilds the read models from its global stream and
/// assembles the blog with its processors.
///
/// # Errors
///
/// Returns `AppError::Domain` if the store cannot be opened or replayed and
/// `AppError::Server` if the outbox directory cannot be created.
pub async fn build_state(
    config: &Config,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
) -> Result<AppState, AppError> {
    let mut store = FileEventStore::open(&config.data_dir)
        .await
        .map_err(DomainError::from)?;
    register_post_events(&mut store);
    let store = Arc::new(store);

    let read_models = ReadModels::bootstrap(&*store).await?;
    let mailer = OutboxMailer::open(&config.outbox_dir).await?;

    info!(
        data_dir = %config.data_dir.display(),
        outbox_dir = %mailer.dir().display(),
        posts = read_models.posts.len(),
        "blog ready"
    );

    let blog = Blog::new(store, read_models, clock, ids).with_processor(
        CommentAuthenticationMailer::new(Arc::new(mailer), config.base_url.clone()),
    );
    Ok(AppState::new(blog))
}

/// Builds the full application router.
pub fn router(state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1/posts", routes::posts::router())
        .nest("/api/v1/comments", routes::comments::router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
