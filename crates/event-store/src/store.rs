use std::sync::Arc;

use async_trait::async_trait;

use crate::{Aggregate, AggregateId, AggregateType, Event, EventQuery, EventStoreError, Result, Sequence};

/// Core trait for event log implementations.
///
/// The log is the single source of truth and the only shared mutable
/// resource. All implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Pushes the aggregates' pending events to the log.
    ///
    /// For every aggregate, in the order given, the precondition (if any) is
    /// evaluated against the log and the concurrency anchor is compared with
    /// the latest sequence of its scope. Precondition queries also see the
    /// events of earlier aggregates in the same call; own-stream anchors see
    /// the log as it was before the call. If any check fails nothing is
    /// persisted; otherwise
    /// sequences and creation dates are assigned and the committed events
    /// are returned in commit order.
    async fn push(&self, aggregates: Vec<Aggregate>) -> Result<Vec<Event>>;

    /// Retrieves events matching a query, in ascending sequence order.
    async fn query(&self, query: &EventQuery) -> Result<Vec<Event>>;

    /// Returns the sequence of the latest event matching `query`, or the
    /// initial sequence if none matches.
    async fn latest_sequence(&self, query: &EventQuery) -> Result<Sequence>;
}

// Lets several services share one log.
#[async_trait]
impl<T: EventStore + ?Sized> EventStore for Arc<T> {
    async fn push(&self, aggregates: Vec<Aggregate>) -> Result<Vec<Event>> {
        (**self).push(aggregates).await
    }

    async fn query(&self, query: &EventQuery) -> Result<Vec<Event>> {
        (**self).query(query).await
    }

    async fn latest_sequence(&self, query: &EventQuery) -> Result<Sequence> {
        (**self).latest_sequence(query).await
    }
}

/// Extension trait providing convenience methods for event stores.
#[async_trait]
pub trait EventStoreExt: EventStore {
    /// Pushes a single aggregate.
    async fn push_aggregate(&self, aggregate: Aggregate) -> Result<Vec<Event>> {
        self.push(vec![aggregate]).await
    }

    /// Retrieves the full stream of one aggregate.
    async fn events_for_aggregate(
        &self,
        aggregate_type: AggregateType,
        aggregate_id: AggregateId,
    ) -> Result<Vec<Event>> {
        self.query(&EventQuery::for_aggregate(aggregate_type, aggregate_id))
            .await
    }
}

// Blanket implementation for all EventStore implementations
impl<T: EventStore + ?Sized> EventStoreExt for T {}

/// Validates aggregates before they are pushed.
pub fn validate_aggregates_for_push(aggregates: &[Aggregate]) -> Result<()> {
    for aggregate in aggregates {
        if aggregate.id().is_empty() {
            return Err(EventStoreError::InvalidAggregate(format!(
                "{} aggregate without id",
                aggregate.aggregate_type()
            )));
        }
        if aggregate.aggregate_type().as_str().is_empty() {
            return Err(EventStoreError::InvalidAggregate(format!(
                "aggregate {} without type",
                aggregate.id()
            )));
        }
        if aggregate.events().is_empty() {
            return Err(EventStoreError::InvalidAggregate(format!(
                "{} {} has no events to push",
                aggregate.aggregate_type(),
                aggregate.id()
            )));
        }
    }
    Ok(())
}
