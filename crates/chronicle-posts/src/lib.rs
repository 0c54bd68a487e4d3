//! Chronicle: Posts bounded context.
//!
//! Responsible for publishing and rewording posts, accepting comments and
//! authenticating them, and for the long-lived indexes and views folded from
//! the global event stream.

pub mod application;
pub mod domain;
