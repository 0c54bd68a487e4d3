//! Cross-aggregate index of post titles and comment ownership.

use std::collections::{BTreeMap, BTreeSet};

use chronicle_core::observer::Observer;

use crate::domain::events::PostEvent;

/// Index folded from the global stream, consulted while validating commands.
///
/// Knows every published title (for uniqueness) and which post each comment
/// belongs to (so a comment can be authenticated by its id alone).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostIndex {
    titles: BTreeSet<String>,
    comment_posts: BTreeMap<String, String>,
}

impl PostIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether no published post uses `title` yet.
    #[must_use]
    pub fn is_title_unique(&self, title: &str) -> bool {
        !self.titles.contains(title)
    }

    /// The post that `comment_id` was made on.
    #[must_use]
    pub fn post_for_comment(&self, comment_id: &str) -> Option<&str> {
        self.comment_posts.get(comment_id).map(String::as_str)
    }

    /// Number of published posts.
    #[must_use]
    pub fn post_count(&self) -> usize {
        self.titles.len()
    }
}

impl Observer<PostEvent> for PostIndex {
    fn observe(&mut self, event: &PostEvent) {
        match event {
            PostEvent::Published(e) => {
                self.titles.insert(e.title.clone());
            }
            PostEvent::Commented(e) => {
                self.comment_posts
                    .insert(e.comment_id.clone(), e.post_id.clone());
            }
            PostEvent::Reworded(_) | PostEvent::CommentAuthenticated(_) => {}
        }
    }
}
