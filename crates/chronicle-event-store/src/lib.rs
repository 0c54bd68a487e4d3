//! Chronicle Event Store: durable, file-system backed event log.
//!
//! Every event is written to the directory of its aggregate's stream and to
//! the global `all` stream, one pretty-printed JSON envelope per file.

pub mod file_store;
pub mod layout;

pub use file_store::FileEventStore;
