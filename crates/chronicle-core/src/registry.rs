//! Event type registry.
//!
//! Maps the type tag written into every stored envelope to a decode function
//! that rebuilds the closed event sum type from the JSON payload. The registry
//! is filled once at start-up and only read afterwards.

use std::collections::HashMap;
use std::fmt;

use crate::event::EventPayload;

type Decoder<E> = fn(serde_json::Value) -> Result<E, serde_json::Error>;

/// Registry of decode functions keyed by event type tag.
pub struct EventRegistry<E> {
    decoders: HashMap<&'static str, Decoder<E>>,
}

impl<E> EventRegistry<E> {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            decoders: HashMap::new(),
        }
    }

    /// Registers the payload shape `P` under `P::TAG`.
    ///
    /// Registering the same tag twice replaces the earlier decoder.
    pub fn register<P>(&mut self)
    where
        P: EventPayload + Into<E>,
    {
        self.decoders.insert(P::TAG, decode_as::<P, E>);
    }

    /// Whether a decoder is registered for `tag`.
    #[must_use]
    pub fn contains(&self, tag: &str) -> bool {
        self.decoders.contains_key(tag)
    }

    /// Registered tags, in no particular order.
    pub fn tags(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.decoders.keys().copied()
    }

    /// Decodes `payload` into the event shape registered for `tag`.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error if the payload does not match the
    /// registered shape.
    ///
    /// # Panics
    ///
    /// Panics if `tag` was never registered. Stored data referencing an
    /// unknown type means code and data have drifted apart; this is not a
    /// condition the caller can recover from.
    pub fn decode(&self, tag: &str, payload: serde_json::Value) -> Result<E, serde_json::Error> {
        let Some(decoder) = self.decoders.get(tag) else {
            panic!("event type {tag:?} not registered");
        };
        decoder(payload)
    }
}

impl<E> Default for EventRegistry<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for EventRegistry<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tags: Vec<&str> = self.tags().collect();
        tags.sort_unstable();
        f.debug_struct("EventRegistry").field("tags", &tags).finish()
    }
}

fn decode_as<P, E>(payload: serde_json::Value) -> Result<E, serde_json::Error>
where
    P: EventPayload + Into<E>,
{
    serde_json::from_value::<P>(payload).map(Into::into)
}
