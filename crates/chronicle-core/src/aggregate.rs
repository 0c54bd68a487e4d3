//! Aggregate root abstraction.

use crate::clock::Clock;
use crate::command::Command;
use crate::event::{DomainEvent, Events};
use crate::ids::IdGenerator;
use crate::validation::ValidationError;

/// Services an aggregate may use while deciding on a command.
#[derive(Clone, Copy)]
pub struct CommandContext<'a> {
    /// Timestamps for new events.
    pub clock: &'a dyn Clock,
    /// Identifiers for new entities.
    pub ids: &'a dyn IdGenerator,
}

/// Outcome of handling a command: the events to commit, in order, and any
/// validation violations found along the way.
///
/// Some transitions emit their event even when validation fails, so both
/// halves are kept and the caller decides what to persist.
#[derive(Debug)]
pub struct Decision<E> {
    events: Events<E>,
    violations: ValidationError,
}

impl<E> Decision<E> {
    /// Valid command producing `events`.
    #[must_use]
    pub fn accept(events: Events<E>) -> Self {
        Self {
            events,
            violations: ValidationError::new(),
        }
    }

    /// Valid command that changes nothing.
    #[must_use]
    pub fn unchanged() -> Self {
        Self::accept(Events::none())
    }

    /// Rejected command; no events.
    #[must_use]
    pub fn reject(violations: ValidationError) -> Self {
        Self {
            events: Events::none(),
            violations,
        }
    }

    /// Events emitted together with the violations found while producing them.
    #[must_use]
    pub fn flagged(events: Events<E>, violations: ValidationError) -> Self {
        Self { events, violations }
    }

    /// The emitted events.
    #[must_use]
    pub fn events(&self) -> &Events<E> {
        &self.events
    }

    /// The violations found; empty for a valid command.
    #[must_use]
    pub fn violations(&self) -> &ValidationError {
        &self.violations
    }

    /// Whether no violation was found.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    /// Splits the decision into its events and violations.
    #[must_use]
    pub fn into_parts(self) -> (Events<E>, ValidationError) {
        (self.events, self.violations)
    }

    /// Returns the events of a valid decision.
    ///
    /// # Errors
    ///
    /// Returns the violations, discarding any emitted events, if validation
    /// failed.
    pub fn into_result(self) -> Result<Events<E>, ValidationError> {
        self.violations.into_result()?;
        Ok(self.events)
    }
}

/// Trait for aggregate roots that reconstitute from event history and decide
/// which new events a command produces.
pub trait AggregateRoot: Default + Send + Sync {
    /// The event type this aggregate produces and consumes.
    type Event: DomainEvent;

    /// The closed set of commands this aggregate accepts.
    type Command: Command;

    /// Long-lived, cross-aggregate state consulted during validation.
    type Index: Send + Sync;

    /// Returns the aggregate identifier, once known from history.
    fn aggregate_id(&self) -> Option<&str>;

    /// Returns the current version (number of events applied).
    fn version(&self) -> i64;

    /// Apply an event to mutate internal state (used during reconstitution).
    fn apply(&mut self, event: &Self::Event);

    /// Decides which events `command` produces given the replayed state.
    /// Never mutates the aggregate.
    fn handle(
        &self,
        command: &Self::Command,
        index: &Self::Index,
        ctx: &CommandContext<'_>,
    ) -> Decision<Self::Event>;

    /// Rebuilds an aggregate from nothing by applying `events` in order.
    fn replay<'a, I>(events: I) -> Self
    where
        I: IntoIterator<Item = &'a Self::Event>,
    {
        let mut aggregate = Self::default();
        for event in events {
            aggregate.apply(event);
        }
        aggregate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::Violation;

    #[test]
    fn test_flagged_decision_keeps_events_and_violations() {
        // Arrange
        let mut verr = ValidationError::new();
        verr.add("Author", Violation::Empty);

        // Act
        let decision = Decision::flagged(Events::single(1_u8), verr);

        // Assert
        assert!(!decision.is_valid());
        assert_eq!(decision.events().len(), 1);
        let (events, violations) = decision.into_parts();
        assert_eq!(events.into_vec(), vec![1]);
        assert!(violations.has("Author", Violation::Empty));
    }

    #[test]
    fn test_into_result_discards_events_of_invalid_decision() {
        let mut verr = ValidationError::new();
        verr.add("Comment", Violation::NotFound);

        let result = Decision::flagged(Events::single(1_u8), verr).into_result();

        assert!(result.is_err());
    }

    #[test]
    fn test_unchanged_is_valid_and_empty() {
        let decision: Decision<u8> = Decision::unchanged();

        assert!(decision.is_valid());
        assert!(decision.into_result().unwrap().is_empty());
    }
}
