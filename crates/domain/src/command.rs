//! Command handling infrastructure.

use event_store::{Aggregate, Event, EventStore};

use crate::error::DomainError;
use crate::read_model::ReadModel;

/// Runs commands against the event log.
///
/// The handler is responsible for:
/// 1. Rehydrating read models from the log
/// 2. Pushing the aggregates a command built, as one batch
/// 3. Folding the committed events back into the caller's read model
pub struct CommandHandler<S: EventStore> {
    store: S,
}

impl<S: EventStore> CommandHandler<S> {
    /// Creates a new command handler with the given event store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns a reference to the underlying event store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Folds every event the model has not processed yet.
    pub async fn load<M: ReadModel>(&self, model: &mut M) -> Result<(), DomainError> {
        let query = model.query().after_sequence(model.processed_sequence());
        let events = self.store.query(&query).await?;
        model.append_and_reduce(events)
    }

    /// Pushes `aggregates` and folds the committed events into `model`.
    ///
    /// Returns every committed event, including those outside the model.
    pub async fn execute<M: ReadModel>(
        &self,
        aggregates: Vec<Aggregate>,
        model: &mut M,
    ) -> Result<Vec<Event>, DomainError> {
        let events = self.store.push(aggregates).await?;
        model.append_and_reduce(events.iter().cloned())?;
        Ok(events)
    }
}
