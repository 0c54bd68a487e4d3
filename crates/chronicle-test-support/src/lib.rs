//! Shared test doubles and utilities for the Chronicle blog engine.

mod clock;
mod ids;
mod store;

pub use clock::FixedClock;
pub use ids::SequentialIds;
pub use store::{FailingEventStore, InMemoryEventStore};
