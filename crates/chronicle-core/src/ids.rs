//! Identifier generation abstraction for determinism.
//!
//! In production, identifiers are random UUIDs. In tests and replays,
//! a predictable implementation is injected.

use uuid::Uuid;

/// Abstraction over the generation of new entity identifiers.
pub trait IdGenerator: Send + Sync {
    /// Returns a fresh identifier that has never been handed out before.
    fn next_id(&self) -> String;
}

/// Production generator backed by random (v4) UUIDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIds;

impl IdGenerator for RandomIds {
    fn next_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}
