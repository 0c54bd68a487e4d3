//! The blog orchestrator.
//!
//! Routes each command to the `Post` aggregate, commits the resulting events
//! and keeps the read models and processors in step with the global stream.

use std::sync::Arc;

use chronicle_core::aggregate::CommandContext;
use chronicle_core::clock::Clock;
use chronicle_core::command::Command;
use chronicle_core::error::DomainError;
use chronicle_core::event::{DomainEvent, Events};
use chronicle_core::ids::IdGenerator;
use chronicle_core::observer::Observer;
use chronicle_core::store::EventStore;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, instrument, warn};

use crate::application::command_handlers;
use crate::application::processors::Processor;
use crate::application::views::{AllPostsView, PostView};
use crate::domain::commands::PostCommand;
use crate::domain::events::PostEvent;
use crate::domain::index::PostIndex;

/// Every long-lived observer of the global stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadModels {
    /// Titles and comment ownership, consulted by command validation.
    pub index: PostIndex,
    /// Posts as served to readers.
    pub posts: AllPostsView,
}

impl ReadModels {
    /// Loads the whole global stream once and folds it into fresh read
    /// models. Nothing is stored and no processor runs.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Storage` if the global stream cannot be read.
    pub async fn bootstrap(store: &dyn EventStore<PostEvent>) -> Result<Self, DomainError> {
        let history = store.load_all().await?;
        let models = Self::replay(&history);
        info!(
            events = history.len(),
            posts = models.posts.len(),
            "read models rebuilt from global stream"
        );
        Ok(models)
    }

    /// Folds `events` into fresh read models.
    #[must_use]
    pub fn replay<'a, I>(events: I) -> Self
    where
        I: IntoIterator<Item = &'a PostEvent>,
    {
        let mut models = Self::default();
        for event in events {
            models.observe(event);
        }
        models
    }
}

impl Observer<PostEvent> for ReadModels {
    fn observe(&mut self, event: &PostEvent) {
        self.index.observe(event);
        self.posts.observe(event);
    }
}

/// How committed events are dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchMode {
    /// New events: store, observe, then run processors.
    Live,
    /// Already durable events: observe only.
    Replay,
}

/// Orchestrates command handling for the blog.
pub struct Blog {
    store: Arc<dyn EventStore<PostEvent>>,
    read_models: RwLock<ReadModels>,
    processors: Vec<Box<dyn Processor>>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
    pipeline: Mutex<()>,
}

impl Blog {
    /// Creates an orchestrator over `store`, starting from `read_models`
    /// (usually the result of [`ReadModels::bootstrap`]).
    #[must_use]
    pub fn new(
        store: Arc<dyn EventStore<PostEvent>>,
        read_models: ReadModels,
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        Self {
            store,
            read_models: RwLock::new(read_models),
            processors: Vec::new(),
            clock,
            ids,
            pipeline: Mutex::new(()),
        }
    }

    /// Adds a processor, run in registration order after each live event.
    #[must_use]
    pub fn with_processor(mut self, processor: impl Processor + 'static) -> Self {
        self.processors.push(Box::new(processor));
        self
    }

    /// Handles one command and returns the events it committed.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` if the targeted post or comment does
    /// not exist, `DomainError::Validation` if the command was rejected (in
    /// which case nothing was stored), and `DomainError::Storage` if the
    /// store failed. A storage failure stops the command part way; events
    /// committed before it stay committed and observed.
    #[instrument(skip_all, fields(command = command.command_type()))]
    pub async fn handle_command(
        &self,
        mut command: PostCommand,
    ) -> Result<Events<PostEvent>, DomainError> {
        command.sanitize();
        let _pipeline = self.pipeline.lock().await;

        let decision = {
            let models = self.read_models.read().await;
            let ctx = CommandContext {
                clock: self.clock.as_ref(),
                ids: self.ids.as_ref(),
            };
            command_handlers::decide(&command, self.store.as_ref(), &models.index, &ctx).await?
        };

        let events = decision.into_result().map_err(|violations| {
            debug!(%violations, "command rejected");
            DomainError::from(violations)
        })?;

        self.dispatch(&events, DispatchMode::Live).await?;
        debug!(events = events.len(), "command committed");
        Ok(events)
    }

    /// Feeds events that are already durable to the read models, without
    /// storing them again or running processors. Start-up goes through
    /// [`ReadModels::bootstrap`] before the orchestrator exists.
    #[cfg(test)]
    pub(crate) async fn replay(&self, events: &Events<PostEvent>) -> Result<(), DomainError> {
        let _pipeline = self.pipeline.lock().await;
        self.dispatch(events, DispatchMode::Replay).await
    }

    async fn dispatch(
        &self,
        events: &Events<PostEvent>,
        mode: DispatchMode,
    ) -> Result<(), DomainError> {
        for event in events {
            if mode == DispatchMode::Live {
                if let Err(err) = self.store.store(event).await {
                    error!(
                        stream = event.aggregate_id(),
                        tag = event.tag(),
                        error = %err,
                        "failed to store event"
                    );
                    return Err(err.into());
                }
            }

            self.read_models.write().await.observe(event);

            if mode == DispatchMode::Live {
                self.run_processors(event).await;
            }
        }
        Ok(())
    }

    async fn run_processors(&self, event: &PostEvent) {
        if self.processors.is_empty() {
            return;
        }
        let models = self.read_models.read().await;
        for processor in &self.processors {
            if let Err(err) = processor.process(event, &models.posts).await {
                warn!(
                    processor = processor.name(),
                    tag = event.tag(),
                    error = %err,
                    "processor failed"
                );
            }
        }
    }

    /// Looks up a post by id.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` if no such post was published.
    pub async fn post(&self, post_id: &str) -> Result<PostView, DomainError> {
        self.read_models
            .read()
            .await
            .posts
            .post(post_id)
            .cloned()
            .ok_or_else(|| DomainError::NotFound(post_id.to_owned()))
    }

    /// All posts, most recently published first.
    pub async fn posts(&self) -> Vec<PostView> {
        self.read_models
            .read()
            .await
            .posts
            .newest_first()
            .into_iter()
            .cloned()
            .collect()
    }

    /// The post a comment was made on.
    pub async fn post_id_for_comment(&self, comment_id: &str) -> Option<String> {
        self.read_models
            .read()
            .await
            .index
            .post_for_comment(comment_id)
            .map(ToOwned::to_owned)
    }

    /// A snapshot of the current read models.
    pub async fn read_models(&self) -> ReadModels {
        self.read_models.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chronicle_core::error::DomainError;
    use chronicle_core::event::Events;
    use chronicle_core::store::EventStore;
    use chronicle_core::validation::Violation;
    use chronicle_test_support::{FixedClock, InMemoryEventStore, SequentialIds};

    use super::{Blog, ReadModels};
    use crate::application::processors::CommentAuthenticationMailer;
    use crate::application::processors::testing::RecordingMailer;
    use crate::domain::aggregates::{AUTHOR_FIELD, COMMENT_FIELD, TITLE_FIELD};
    use crate::domain::commands::{AuthenticateComment, CommentOnPost, PublishPost, RewordPost};
    use crate::domain::events::{PostCommented, PostEvent, PostPublished};

    fn blog_over(
        store: &Arc<InMemoryEventStore<PostEvent>>,
        read_models: ReadModels,
        mailer: &Arc<RecordingMailer>,
    ) -> Blog {
        Blog::new(
            store.clone(),
            read_models,
            Arc::new(FixedClock::default_instant()),
            Arc::new(SequentialIds::new("id")),
        )
        .with_processor(CommentAuthenticationMailer::new(
            mailer.clone(),
            "http://localhost:3000",
        ))
    }

    fn publish(title: &str, content: &str) -> PublishPost {
        PublishPost {
            title: title.to_owned(),
            content: content.to_owned(),
        }
    }

    fn reword(post_id: &str, new_content: &str) -> RewordPost {
        RewordPost {
            post_id: post_id.to_owned(),
            new_content: new_content.to_owned(),
            reason: None,
        }
    }

    fn comment(post_id: &str, author: &str) -> CommentOnPost {
        CommentOnPost {
            post_id: post_id.to_owned(),
            author: author.to_owned(),
            email: "ada@example.com".to_owned(),
            content: "Nice post".to_owned(),
        }
    }

    fn authenticate(comment_id: &str) -> AuthenticateComment {
        AuthenticateComment {
            comment_id: comment_id.to_owned(),
        }
    }

    #[tokio::test]
    async fn test_publish_and_reword_end_to_end() {
        // Arrange
        let store = Arc::new(InMemoryEventStore::new());
        let mailer = Arc::new(RecordingMailer::default());
        let blog = blog_over(&store, ReadModels::default(), &mailer);

        // Act
        let published = blog
            .handle_command(publish("  Hello  ", "  World  ").into())
            .await
            .unwrap();
        let unchanged = blog
            .handle_command(reword("id-1", "World").into())
            .await
            .unwrap();
        let reworded = blog
            .handle_command(reword("id-1", "Goodbye").into())
            .await
            .unwrap();

        // Assert
        match published.as_slice() {
            [PostEvent::Published(payload)] => {
                assert_eq!(payload.post_id, "id-1");
                assert_eq!(payload.title, "Hello");
                assert_eq!(payload.content, "World");
            }
            other => panic!("expected one Published, got {other:?}"),
        }
        assert!(unchanged.is_empty());
        match reworded.as_slice() {
            [PostEvent::Reworded(payload)] => assert_eq!(payload.content, "Goodbye"),
            other => panic!("expected one Reworded, got {other:?}"),
        }
        assert_eq!(store.stored_events().len(), 2);
        assert_eq!(blog.post("id-1").await.unwrap().content, "Goodbye");
    }

    #[tokio::test]
    async fn test_publishing_same_title_twice_is_rejected() {
        // Arrange
        let store = Arc::new(InMemoryEventStore::new());
        let mailer = Arc::new(RecordingMailer::default());
        let blog = blog_over(&store, ReadModels::default(), &mailer);
        blog.handle_command(publish("Hello", "World").into())
            .await
            .unwrap();

        // Act
        let result = blog.handle_command(publish(" Hello ", "Again").into()).await;

        // Assert
        match result {
            Err(DomainError::Validation(verr)) => {
                assert!(verr.has(TITLE_FIELD, Violation::NotUnique));
            }
            other => panic!("expected Validation, got {other:?}"),
        }
        assert_eq!(store.stored_events().len(), 1);
        assert_eq!(blog.posts().await.len(), 1);
        assert!(!blog.read_models().await.index.is_title_unique("Hello"));
    }

    #[tokio::test]
    async fn test_empty_reword_is_rejected() {
        let store = Arc::new(InMemoryEventStore::new());
        let mailer = Arc::new(RecordingMailer::default());
        let blog = blog_over(&store, ReadModels::default(), &mailer);
        blog.handle_command(publish("Hello", "World").into())
            .await
            .unwrap();

        let result = blog.handle_command(reword("id-1", "   ").into()).await;

        assert!(matches!(result, Err(DomainError::Validation(_))));
        assert_eq!(store.stored_events().len(), 1);
    }

    #[tokio::test]
    async fn test_comment_on_never_published_post_appends_nothing() {
        // Arrange
        let store = Arc::new(InMemoryEventStore::new());
        let mailer = Arc::new(RecordingMailer::default());
        let blog = blog_over(&store, ReadModels::default(), &mailer);

        // Act
        let result = blog.handle_command(comment("post-9", "Ada").into()).await;

        // Assert
        match result {
            Err(DomainError::NotFound(id)) => assert_eq!(id, "post-9"),
            other => panic!("expected NotFound, got {other:?}"),
        }
        assert!(store.load_all().await.unwrap().is_empty());
        assert!(mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn test_comment_is_mailed_and_visible_once_authenticated() {
        // Arrange
        let store = Arc::new(InMemoryEventStore::new());
        let mailer = Arc::new(RecordingMailer::default());
        let blog = blog_over(&store, ReadModels::default(), &mailer);
        blog.handle_command(publish("Hello", "World").into())
            .await
            .unwrap();

        // Act
        let commented = blog
            .handle_command(comment("id-1", " Ada ").into())
            .await
            .unwrap();
        let pending = blog.post("id-1").await.unwrap();
        let authenticated = blog
            .handle_command(authenticate("id-2").into())
            .await
            .unwrap();
        let again = blog.handle_command(authenticate("id-2").into()).await;

        // Assert
        assert_eq!(commented.len(), 1);
        assert!(pending.comments.is_empty());
        assert_eq!(blog.post_id_for_comment("id-2").await.as_deref(), Some("id-1"));

        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].body.starts_with("Hello Ada,"));
        assert!(sent[0].body.contains("http://localhost:3000/comments/id-2"));

        assert_eq!(authenticated.len(), 1);
        let post = blog.post("id-1").await.unwrap();
        assert_eq!(post.comments.len(), 1);
        assert_eq!(post.comments[0].author, "Ada");

        match again {
            Err(DomainError::Validation(verr)) => {
                assert!(verr.has(COMMENT_FIELD, Violation::AlreadyAuthenticated));
            }
            other => panic!("expected Validation, got {other:?}"),
        }
        assert_eq!(store.stored_events().len(), 3);
    }

    #[tokio::test]
    async fn test_invalid_comment_is_not_persisted_or_mailed() {
        let store = Arc::new(InMemoryEventStore::new());
        let mailer = Arc::new(RecordingMailer::default());
        let blog = blog_over(&store, ReadModels::default(), &mailer);
        blog.handle_command(publish("Hello", "World").into())
            .await
            .unwrap();

        let result = blog.handle_command(comment("id-1", "  ").into()).await;

        match result {
            Err(DomainError::Validation(verr)) => {
                assert!(verr.has(AUTHOR_FIELD, Violation::Empty));
            }
            other => panic!("expected Validation, got {other:?}"),
        }
        assert_eq!(store.stored_events().len(), 1);
        assert!(mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn test_authenticating_unknown_comment_is_not_found() {
        let store = Arc::new(InMemoryEventStore::new());
        let mailer = Arc::new(RecordingMailer::default());
        let blog = blog_over(&store, ReadModels::default(), &mailer);

        let result = blog.handle_command(authenticate("nope").into()).await;

        assert!(matches!(result, Err(DomainError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_bootstrap_replays_history_without_side_effects() {
        // Arrange
        let now = FixedClock::default_instant().0;
        let store = Arc::new(InMemoryEventStore::with_history(vec![
            PostEvent::Published(PostPublished {
                post_id: "post-1".to_owned(),
                title: "Hello".to_owned(),
                content: "World".to_owned(),
                published_at: now,
            }),
            PostEvent::Commented(PostCommented {
                post_id: "post-1".to_owned(),
                comment_id: "comment-1".to_owned(),
                author: "Ada".to_owned(),
                email: "ada@example.com".to_owned(),
                content: "Nice".to_owned(),
                commented_at: now,
            }),
        ]));
        let mailer = Arc::new(RecordingMailer::default());

        // Act
        let read_models = ReadModels::bootstrap(&*store).await.unwrap();
        let blog = blog_over(&store, read_models, &mailer);

        // Assert
        assert_eq!(store.stored_events().len(), 2);
        assert!(mailer.sent().is_empty());
        assert_eq!(blog.post("post-1").await.unwrap().title, "Hello");
        let duplicate = blog.handle_command(publish("Hello", "Again").into()).await;
        assert!(matches!(duplicate, Err(DomainError::Validation(_))));
        let authenticated = blog
            .handle_command(authenticate("comment-1").into())
            .await
            .unwrap();
        assert_eq!(authenticated.len(), 1);
    }

    #[tokio::test]
    async fn test_replaying_global_stream_matches_incremental_read_models() {
        // Arrange
        let store = Arc::new(InMemoryEventStore::new());
        let mailer = Arc::new(RecordingMailer::default());
        let blog = blog_over(&store, ReadModels::default(), &mailer);

        // Act
        blog.handle_command(publish("Hello", "World").into())
            .await
            .unwrap();
        blog.handle_command(publish("Second", "Post").into())
            .await
            .unwrap();
        blog.handle_command(reword("id-1", "Goodbye").into())
            .await
            .unwrap();
        blog.handle_command(comment("id-2", "Ada").into())
            .await
            .unwrap();
        blog.handle_command(authenticate("id-3").into())
            .await
            .unwrap();
        let replayed = ReadModels::bootstrap(&*store).await.unwrap();

        // Assert
        assert_eq!(blog.read_models().await, replayed);
    }

    #[tokio::test]
    async fn test_replay_mode_observes_without_storing_or_processing() {
        let store = Arc::new(InMemoryEventStore::new());
        let mailer = Arc::new(RecordingMailer::default());
        let blog = blog_over(&store, ReadModels::default(), &mailer);
        let now = FixedClock::default_instant().0;
        let events = Events::from(vec![
            PostEvent::Published(PostPublished {
                post_id: "post-1".to_owned(),
                title: "Hello".to_owned(),
                content: "World".to_owned(),
                published_at: now,
            }),
            PostEvent::Commented(PostCommented {
                post_id: "post-1".to_owned(),
                comment_id: "comment-1".to_owned(),
                author: "Ada".to_owned(),
                email: "ada@example.com".to_owned(),
                content: "Nice".to_owned(),
                commented_at: now,
            }),
        ]);

        blog.replay(&events).await.unwrap();

        assert!(store.stored_events().is_empty());
        assert!(mailer.sent().is_empty());
        assert_eq!(blog.posts().await.len(), 1);
    }

    #[tokio::test]
    async fn test_store_failure_leaves_read_models_untouched() {
        // Arrange
        let store = Arc::new(InMemoryEventStore::failing_after(0));
        let mailer = Arc::new(RecordingMailer::default());
        let blog = blog_over(&store, ReadModels::default(), &mailer);

        // Act
        let result = blog.handle_command(publish("Hello", "World").into()).await;

        // Assert
        assert!(matches!(result, Err(DomainError::Storage(_))));
        assert!(blog.posts().await.is_empty());
        assert!(blog.read_models().await.index.is_title_unique("Hello"));
    }

    #[tokio::test]
    async fn test_processor_failure_does_not_fail_command() {
        let store = Arc::new(InMemoryEventStore::new());
        let mailer = Arc::new(RecordingMailer::failing());
        let blog = blog_over(&store, ReadModels::default(), &mailer);
        blog.handle_command(publish("Hello", "World").into())
            .await
            .unwrap();

        let result = blog.handle_command(comment("id-1", "Ada").into()).await;

        assert!(result.is_ok());
        assert_eq!(store.stored_events().len(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_publishes_of_same_title_admit_exactly_one() {
        // Arrange
        let store = Arc::new(InMemoryEventStore::new());
        let mailer = Arc::new(RecordingMailer::default());
        let blog = Arc::new(blog_over(&store, ReadModels::default(), &mailer));

        // Act
        let tasks: Vec<_> = (0..8)
            .map(|i| {
                let blog = Arc::clone(&blog);
                tokio::spawn(async move {
                    blog.handle_command(publish("Hello", &format!("draft {i}")).into())
                        .await
                })
            })
            .collect();
        let mut accepted = 0;
        for task in tasks {
            if task.await.unwrap().is_ok() {
                accepted += 1;
            }
        }

        // Assert
        assert_eq!(accepted, 1);
        assert_eq!(store.stored_events().len(), 1);
    }
}
