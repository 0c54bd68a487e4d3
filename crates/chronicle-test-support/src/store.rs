//! Test stores: in-memory `EventStore` implementations for tests.

use std::sync::Mutex;

use async_trait::async_trait;
use chronicle_core::event::{ALL_STREAM, DomainEvent, Events};
use chronicle_core::store::{EventStore, StoreError, check_stream_id};

/// An event store that keeps the global log in memory. Streams are derived
/// from each event's aggregate id, so `load_stream` behaves like the on-disk
/// store, including `NotFound` for streams that were never written.
#[derive(Debug)]
pub struct InMemoryEventStore<E> {
    all: Mutex<Vec<E>>,
    remaining_writes: Mutex<Option<usize>>,
}

impl<E: DomainEvent + Clone> InMemoryEventStore<E> {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            all: Mutex::new(Vec::new()),
            remaining_writes: Mutex::new(None),
        }
    }

    /// Create a store whose global log already holds `events`, as if a
    /// previous process had committed them.
    #[must_use]
    pub fn with_history(events: Vec<E>) -> Self {
        Self {
            all: Mutex::new(events),
            remaining_writes: Mutex::new(None),
        }
    }

    /// Create a store that accepts `writes` appends and fails every append
    /// after that with an I/O error.
    #[must_use]
    pub fn failing_after(writes: usize) -> Self {
        Self {
            all: Mutex::new(Vec::new()),
            remaining_writes: Mutex::new(Some(writes)),
        }
    }

    /// Returns a snapshot of the global log in commit order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn stored_events(&self) -> Vec<E> {
        self.all.lock().unwrap().clone()
    }
}

impl<E: DomainEvent + Clone> Default for InMemoryEventStore<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<E: DomainEvent + Clone> EventStore<E> for InMemoryEventStore<E> {
    async fn store(&self, event: &E) -> Result<(), StoreError> {
        check_stream_id("store", event.aggregate_id())?;

        let mut remaining = self.remaining_writes.lock().unwrap();
        if let Some(n) = remaining.as_mut() {
            if *n == 0 {
                return Err(StoreError::Io {
                    op: "store",
                    stream: ALL_STREAM.to_owned(),
                    source: std::io::Error::other("disk full"),
                });
            }
            *n -= 1;
        }

        self.all.lock().unwrap().push(event.clone());
        Ok(())
    }

    async fn load_stream(&self, id: &str) -> Result<Events<E>, StoreError> {
        let all = self.all.lock().unwrap();
        if id == ALL_STREAM {
            return Ok(all.iter().cloned().collect());
        }

        let events: Events<E> = all
            .iter()
            .filter(|e| e.aggregate_id() == id)
            .cloned()
            .collect();
        if events.is_empty() {
            return Err(StoreError::NotFound {
                op: "load_stream",
                stream: id.to_owned(),
            });
        }
        Ok(events)
    }
}

/// An event store that always returns an I/O error. Useful for testing
/// error-handling paths.
#[derive(Debug)]
pub struct FailingEventStore;

#[async_trait]
impl<E: DomainEvent> EventStore<E> for FailingEventStore {
    async fn store(&self, event: &E) -> Result<(), StoreError> {
        Err(StoreError::Io {
            op: "store",
            stream: event.aggregate_id().to_owned(),
            source: std::io::Error::other("connection refused"),
        })
    }

    async fn load_stream(&self, id: &str) -> Result<Events<E>, StoreError> {
        Err(StoreError::Io {
            op: "load_stream",
            stream: id.to_owned(),
            source: std::io::Error::other("connection refused"),
        })
    }
}
