//! Observer abstraction.

/// A long-lived index or projection folded from committed events.
///
/// Observers see every event: during start-up replay as well as for newly
/// committed commands. They must only ever be fed events that are already
/// durably stored, in commit order.
pub trait Observer<E>: Send + Sync {
    /// Folds one event into the observer's state.
    fn observe(&mut self, event: &E);
}
