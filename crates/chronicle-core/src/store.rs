//! Event store abstraction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::event::{ALL_STREAM, DomainEvent, Events};
use crate::registry::EventRegistry;

/// Stored representation of a domain event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    /// When the event was committed to the store.
    pub stored_at: DateTime<Utc>,
    /// Event type tag for deserialization routing.
    #[serde(rename = "type")]
    pub event_type: String,
    /// Serialized event payload.
    pub payload: serde_json::Value,
}

impl Envelope {
    /// Wraps `event` for storage.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error if the payload cannot be serialized.
    pub fn seal<E: DomainEvent>(
        event: &E,
        stored_at: DateTime<Utc>,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            stored_at,
            event_type: event.tag().to_owned(),
            payload: event.to_payload()?,
        })
    }

    /// Decodes the payload through `registry`.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error if the payload does not match the shape
    /// registered for its tag.
    ///
    /// # Panics
    ///
    /// Panics if the envelope's type tag is not registered.
    pub fn open<E>(self, registry: &EventRegistry<E>) -> Result<E, serde_json::Error> {
        registry.decode(&self.event_type, self.payload)
    }
}

/// Errors reported by event store operations. Each variant records the
/// operation and the stream it was working on.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The stream has never been written to.
    #[error("{op} {stream}: not found")]
    NotFound {
        /// The operation that failed.
        op: &'static str,
        /// The stream operated on.
        stream: String,
    },

    /// The event's aggregate id is empty or the reserved global stream id.
    #[error("{op} {stream:?}: reserved or empty stream id")]
    ReservedStream {
        /// The operation that failed.
        op: &'static str,
        /// The rejected stream id.
        stream: String,
    },

    /// The underlying storage failed.
    #[error("{op} {stream}: internal: {source}")]
    Io {
        /// The operation that failed.
        op: &'static str,
        /// The stream operated on.
        stream: String,
        /// The I/O error produced by the storage medium.
        #[source]
        source: std::io::Error,
    },

    /// An envelope or payload could not be (de)serialized.
    #[error("{op} {stream}: serialization: {source}")]
    Serialization {
        /// The operation that failed.
        op: &'static str,
        /// The stream operated on.
        stream: String,
        /// The underlying serialization error.
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    /// Whether this error means the stream does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// The stream the failed operation worked on.
    #[must_use]
    pub fn stream(&self) -> &str {
        match self {
            Self::NotFound { stream, .. }
            | Self::ReservedStream { stream, .. }
            | Self::Io { stream, .. }
            | Self::Serialization { stream, .. } => stream,
        }
    }
}

/// Rejects aggregate ids that may not own a stream.
///
/// # Errors
///
/// Returns `StoreError::ReservedStream` if `id` is empty, equal to
/// [`ALL_STREAM`], or contains a path separator.
pub fn check_stream_id(op: &'static str, id: &str) -> Result<(), StoreError> {
    let invalid = id.is_empty()
        || id == ALL_STREAM
        || id.starts_with('.')
        || id.contains(['/', '\\']);
    if invalid {
        return Err(StoreError::ReservedStream {
            op,
            stream: id.to_owned(),
        });
    }
    Ok(())
}

/// Append-only event log keyed by stream id.
///
/// Every stored event lands in its aggregate's stream and in the global
/// [`ALL_STREAM`], which gives a total commit order over all facts.
#[async_trait]
pub trait EventStore<E: DomainEvent>: Send + Sync {
    /// Durably appends `event` to the global stream and to the stream named
    /// by `event.aggregate_id()`.
    async fn store(&self, event: &E) -> Result<(), StoreError>;

    /// Loads every event stored for `id`, in commit order.
    ///
    /// Fails with `StoreError::NotFound` if the stream was never written.
    async fn load_stream(&self, id: &str) -> Result<Events<E>, StoreError>;

    /// Loads the global stream. Used once at start-up to rebuild derived state.
    async fn load_all(&self) -> Result<Events<E>, StoreError> {
        self.load_stream(ALL_STREAM).await
    }
}
