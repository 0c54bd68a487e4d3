//! Domain event abstractions.

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Stream id of the global log that mirrors every stored event.
///
/// No aggregate may use this value as its identity.
pub const ALL_STREAM: &str = "all";

/// Trait that all domain events implement.
pub trait DomainEvent: Send + Sync + std::fmt::Debug + 'static {
    /// Returns the event type tag (used for serialization routing).
    fn tag(&self) -> &'static str;

    /// Returns the id of the stream this event belongs to.
    fn aggregate_id(&self) -> &str;

    /// Serializes the event payload, without its tag, to JSON.
    ///
    /// # Errors
    ///
    /// Returns the underlying `serde_json` error if the payload cannot be
    /// represented as JSON.
    fn to_payload(&self) -> Result<serde_json::Value, serde_json::Error>;
}

/// A concrete event shape that can be registered for deserialization.
pub trait EventPayload: Serialize + DeserializeOwned {
    /// Stable type tag written to the stored envelope.
    const TAG: &'static str;
}

/// Insertion-ordered collection of events produced by one command or loaded
/// from one stream.
#[derive(Debug, Clone, PartialEq)]
pub struct Events<E> {
    items: Vec<E>,
}

impl<E> Events<E> {
    /// Returns an empty collection.
    #[must_use]
    pub fn none() -> Self {
        Self { items: Vec::new() }
    }

    /// Returns a collection holding exactly one event.
    #[must_use]
    pub fn single(event: E) -> Self {
        Self { items: vec![event] }
    }

    /// Appends an event, keeping insertion order.
    pub fn push(&mut self, event: E) {
        self.items.push(event);
    }

    /// Number of events in the collection.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the collection holds no events.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterates over the events in order.
    pub fn iter(&self) -> std::slice::Iter<'_, E> {
        self.items.iter()
    }

    /// Returns the events as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[E] {
        &self.items
    }

    /// Consumes the collection, returning the underlying vector.
    #[must_use]
    pub fn into_vec(self) -> Vec<E> {
        self.items
    }
}

impl<E> Default for Events<E> {
    fn default() -> Self {
        Self::none()
    }
}

impl<E> From<Vec<E>> for Events<E> {
    fn from(items: Vec<E>) -> Self {
        Self { items }
    }
}

impl<E> FromIterator<E> for Events<E> {
    fn from_iter<I: IntoIterator<Item = E>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl<E> Extend<E> for Events<E> {
    fn extend<I: IntoIterator<Item = E>>(&mut self, iter: I) {
        self.items.extend(iter);
    }
}

impl<E> IntoIterator for Events<E> {
    type Item = E;
    type IntoIter = std::vec::IntoIter<E>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, E> IntoIterator for &'a Events<E> {
    type Item = &'a E;
    type IntoIter = std::slice::Iter<'a, E>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
