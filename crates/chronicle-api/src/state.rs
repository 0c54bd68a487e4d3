//! Shared application state.

use std::sync::Arc;

use chronicle_posts::application::blog::Blog;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// The blog orchestrator.
    pub blog: Arc<Blog>,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(blog: Blog) -> Self {
        Self {
            blog: Arc::new(blog),
        }
    }
}
