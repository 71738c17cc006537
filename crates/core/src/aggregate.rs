//! Aggregate root trait for state-persisted domain models.

/// Aggregate root marker + minimal interface.
///
/// Aggregates mutate their own state through intention-revealing methods and
/// record the domain events those mutations produced. The recorded events are
/// process-local: they live for one use-case execution and are handed to the
/// outbox by the caller. Nothing here clears them implicitly.
pub trait AggregateRoot {
    /// Strongly-typed aggregate identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Domain event type recorded by this aggregate.
    type Event: Clone + core::fmt::Debug;

    /// Returns the aggregate identifier.
    fn id(&self) -> &Self::Id;

    /// Events recorded since construction or the last `clear_events`.
    fn domain_events(&self) -> &[Self::Event];

    /// Drop recorded events. Only needed when an instance is reused after commit.
    fn clear_events(&mut self);
}
