//! Read views for the Posts context.
//!
//! `AllPostsView` is a projection folded from the global stream and serves
//! every post query. Comments become visible only once authenticated.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use chronicle_core::observer::Observer;
use serde::Serialize;

use crate::domain::events::PostEvent;

/// Read-only view of a single comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentView {
    /// The comment identifier.
    pub id: String,
    /// Name of the author.
    pub author: String,
    /// The comment text.
    pub content: String,
    /// When the comment was made.
    pub commented_at: DateTime<Utc>,
}

/// Read-only view of a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostView {
    /// The post identifier.
    pub id: String,
    /// The title.
    pub title: String,
    /// The current content.
    pub content: String,
    /// When the post was published.
    pub published_at: DateTime<Utc>,
    /// When the content was last replaced, if ever.
    pub reworded_at: Option<DateTime<Utc>>,
    /// Authenticated comments, oldest first.
    pub comments: Vec<CommentView>,
    /// Comments still waiting for their author to confirm them.
    #[serde(skip)]
    pub pending_comments: Vec<CommentView>,
}

/// Projection of every published post.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllPostsView {
    posts: Vec<PostView>,
    positions: HashMap<String, usize>,
}

impl AllPostsView {
    /// Creates an empty view.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a post by id.
    #[must_use]
    pub fn post(&self, post_id: &str) -> Option<&PostView> {
        self.positions.get(post_id).map(|&i| &self.posts[i])
    }

    /// All posts, most recently published first.
    #[must_use]
    pub fn newest_first(&self) -> Vec<&PostView> {
        let mut posts: Vec<&PostView> = self.posts.iter().rev().collect();
        posts.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        posts
    }

    /// Number of posts in the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.posts.len()
    }

    /// Whether no post has been published yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    fn post_mut(&mut self, post_id: &str) -> Option<&mut PostView> {
        self.positions.get(post_id).map(|&i| &mut self.posts[i])
    }
}

impl Observer<PostEvent> for AllPostsView {
    fn observe(&mut self, event: &PostEvent) {
        match event {
            PostEvent::Published(e) => {
                self.positions.insert(e.post_id.clone(), self.posts.len());
                self.posts.push(PostView {
                    id: e.post_id.clone(),
                    title: e.title.clone(),
                    content: e.content.clone(),
                    published_at: e.published_at,
                    reworded_at: None,
                    comments: Vec::new(),
                    pending_comments: Vec::new(),
                });
            }
            PostEvent::Reworded(e) => {
                if let Some(post) = self.post_mut(&e.post_id) {
                    post.content.clone_from(&e.content);
                    post.reworded_at = Some(e.reworded_at);
                }
            }
            PostEvent::Commented(e) => {
                if let Some(post) = self.post_mut(&e.post_id) {
                    post.pending_comments.push(CommentView {
                        id: e.comment_id.clone(),
                        author: e.author.clone(),
                        content: e.content.clone(),
                        commented_at: e.commented_at,
                    });
                }
            }
            PostEvent::CommentAuthenticated(e) => {
                let Some(post) = self.post_mut(&e.post_id) else {
                    return;
                };
                if let Some(i) = post.pending_comments.iter().position(|c| c.id == e.comment_id) {
                    let comment = post.pending_comments.remove(i);
                    post.comments.push(comment);
                    post.comments.sort_by_key(|c| c.commented_at);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;
    use crate::domain::events::{CommentAuthenticated, PostCommented, PostPublished, PostReworded};

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap()
    }

    fn published(post_id: &str, title: &str, at: DateTime<Utc>) -> PostEvent {
        PostEvent::Published(PostPublished {
            post_id: post_id.to_owned(),
            title: title.to_owned(),
            content: "World".to_owned(),
            published_at: at,
        })
    }

    fn commented(comment_id: &str, at: DateTime<Utc>) -> PostEvent {
        PostEvent::Commented(PostCommented {
            post_id: "post-1".to_owned(),
            comment_id: comment_id.to_owned(),
            author: "Ada".to_owned(),
            email: "ada@example.com".to_owned(),
            content: format!("comment {comment_id}"),
            commented_at: at,
        })
    }

    fn authenticated(comment_id: &str) -> PostEvent {
        PostEvent::CommentAuthenticated(CommentAuthenticated {
            post_id: "post-1".to_owned(),
            comment_id: comment_id.to_owned(),
            authenticated_at: fixed_now(),
        })
    }

    #[test]
    fn test_reword_updates_content_and_timestamp() {
        // Arrange
        let mut view = AllPostsView::new();
        view.observe(&published("post-1", "Hello", fixed_now()));

        // Act
        view.observe(&PostEvent::Reworded(PostReworded {
            post_id: "post-1".to_owned(),
            content: "Goodbye".to_owned(),
            reason: None,
            reworded_at: fixed_now() + Duration::minutes(5),
        }));

        // Assert
        let post = view.post("post-1").unwrap();
        assert_eq!(post.content, "Goodbye");
        assert_eq!(post.reworded_at, Some(fixed_now() + Duration::minutes(5)));
    }

    #[test]
    fn test_comments_appear_only_after_authentication_in_comment_order() {
        // Arrange
        let mut view = AllPostsView::new();
        view.observe(&published("post-1", "Hello", fixed_now()));
        view.observe(&commented("comment-1", fixed_now() + Duration::minutes(1)));
        view.observe(&commented("comment-2", fixed_now() + Duration::minutes(2)));
        assert!(view.post("post-1").unwrap().comments.is_empty());

        // Act
        view.observe(&authenticated("comment-2"));
        view.observe(&authenticated("comment-1"));

        // Assert
        let post = view.post("post-1").unwrap();
        let ids: Vec<&str> = post.comments.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["comment-1", "comment-2"]);
        assert!(post.pending_comments.is_empty());
    }

    #[test]
    fn test_newest_first_orders_by_publication_time() {
        let mut view = AllPostsView::new();
        view.observe(&published("post-1", "Old", fixed_now()));
        view.observe(&published("post-2", "New", fixed_now() + Duration::hours(1)));

        let titles: Vec<&str> = view.newest_first().iter().map(|p| p.title.as_str()).collect();

        assert_eq!(titles, vec!["New", "Old"]);
        assert_eq!(view.len(), 2);
    }

    #[test]
    fn test_events_for_unknown_posts_are_ignored() {
        let mut view = AllPostsView::new();

        view.observe(&commented("comment-1", fixed_now()));
        view.observe(&authenticated("comment-1"));

        assert!(view.is_empty());
        assert!(view.post("post-1").is_none());
    }
}
