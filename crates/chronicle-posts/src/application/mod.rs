//! Application layer: command handlers, the orchestrator, read views and
//! side-effecting processors.

pub mod blog;
pub mod command_handlers;
pub mod processors;
pub mod views;
