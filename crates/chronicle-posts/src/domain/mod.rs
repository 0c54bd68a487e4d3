//! Domain model: commands, events, the `Post` aggregate and the
//! cross-aggregate index consulted during validation.

pub mod aggregates;
pub mod commands;
pub mod events;
pub mod index;
