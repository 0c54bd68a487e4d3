//! Command abstractions.

/// Trait that all commands implement.
pub trait Command: Send + Sync + std::fmt::Debug {
    /// The type name for this command (for logging/routing).
    fn command_type(&self) -> &'static str;

    /// Normalizes raw input in place, e.g. trimming surrounding whitespace.
    ///
    /// Called by the orchestrator before the command reaches an aggregate.
    fn sanitize(&mut self);
}
