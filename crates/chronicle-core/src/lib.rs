//! Chronicle Core: shared event-sourcing abstractions.
//!
//! This crate defines the fundamental traits and types that the blog's
//! bounded context and the event store depend on: events and their ordered
//! collection, commands, aggregates, the type registry used to decode stored
//! payloads, and the event store contract. It contains no infrastructure code.

pub mod aggregate;
pub mod clock;
pub mod command;
pub mod error;
pub mod event;
pub mod ids;
pub mod observer;
pub mod registry;
pub mod store;
pub mod validation;
