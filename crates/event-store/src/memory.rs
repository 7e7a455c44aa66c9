use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::reporter::{
    CONCURRENCY_CONFLICT_TOTAL, EVENTS_PUSHED_TOTAL, NoopReporter, PRECONDITION_FAILED_TOTAL,
    PUSH_TOTAL, Reporter,
};
use crate::store::{EventStore, validate_aggregates_for_push};
use crate::{Aggregate, Event, EventId, EventQuery, EventStoreError, Result, Sequence};

/// In-memory event log.
///
/// Holds every event in commit order behind a single lock, which makes a
/// push spanning several aggregates atomic.
#[derive(Clone)]
pub struct InMemoryEventStore {
    events: Arc<RwLock<Vec<Event>>>,
    reporter: Arc<dyn Reporter>,
}

impl InMemoryEventStore {
    /// Creates a new empty in-memory event store that reports nothing.
    pub fn new() -> Self {
        Self::with_reporter(Arc::new(NoopReporter))
    }

    /// Creates a new empty in-memory event store reporting to `reporter`.
    pub fn with_reporter(reporter: Arc<dyn Reporter>) -> Self {
        Self {
            events: Arc::new(RwLock::new(Vec::new())),
            reporter,
        }
    }

    /// Returns the total number of events stored.
    pub async fn event_count(&self) -> usize {
        self.events.read().await.len()
    }

    /// Clears all events.
    pub async fn clear(&self) {
        self.events.write().await.clear();
    }
}

impl Default for InMemoryEventStore {
    fn default() -> Self {
        Self::new()
    }
}

fn filter(events: &[Event], query: &EventQuery) -> Vec<Event> {
    let matching = events.iter().filter(|e| query.matches(e)).cloned();
    match query.limit {
        Some(limit) => matching.take(limit).collect(),
        None => matching.collect(),
    }
}

fn latest(events: &[Event], query: &EventQuery) -> Sequence {
    events
        .iter()
        .rev()
        .find(|e| query.matches(e))
        .map(|e| e.sequence)
        .unwrap_or_default()
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    #[tracing::instrument(skip_all, fields(aggregates = aggregates.len()))]
    async fn push(&self, mut aggregates: Vec<Aggregate>) -> Result<Vec<Event>> {
        validate_aggregates_for_push(&aggregates)?;
        if aggregates.is_empty() {
            return Ok(Vec::new());
        }

        let mut store = self.events.write().await;

        let mut sequence = store.last().map(|e| e.sequence).unwrap_or_default();
        let creation_date = Utc::now();
        let mut committed: Vec<Event> = Vec::new();

        for aggregate in aggregates.iter_mut() {
            // Stream anchors are checked against the log as it was before
            // the call; precondition queries also see the events built so
            // far in this push.
            let mut scope_latest = latest(&store, &aggregate.stream_query());

            let precondition_query = aggregate.precondition().map(|p| p.query.clone());
            if let Some(query) = precondition_query {
                let mut matched = filter(&store, &query);
                matched.extend(filter(&committed, &query));
                match aggregate.validate_precondition(&matched) {
                    Ok(true) => {
                        scope_latest = latest(&committed, &query).max(latest(&store, &query));
                    }
                    Ok(false) => {}
                    Err(source) => {
                        tracing::warn!(
                            aggregate_type = %aggregate.aggregate_type(),
                            aggregate_id = %aggregate.id(),
                            reason = %source,
                            "precondition rejected push"
                        );
                        self.reporter.add_count(
                            PRECONDITION_FAILED_TOTAL,
                            1,
                            &[("aggregate_type", aggregate.aggregate_type().to_string())],
                        );
                        return Err(EventStoreError::PreconditionFailed {
                            aggregate_id: aggregate.id().clone(),
                            aggregate_type: aggregate.aggregate_type().clone(),
                            source,
                        });
                    }
                }
            }

            if let Some(expected) = aggregate.previous_sequence()
                && scope_latest != expected
            {
                tracing::warn!(
                    aggregate_type = %aggregate.aggregate_type(),
                    aggregate_id = %aggregate.id(),
                    %expected,
                    actual = %scope_latest,
                    "stale sequence anchor"
                );
                self.reporter.add_count(
                    CONCURRENCY_CONFLICT_TOTAL,
                    1,
                    &[("aggregate_type", aggregate.aggregate_type().to_string())],
                );
                return Err(EventStoreError::ConcurrencyConflict {
                    aggregate_id: aggregate.id().clone(),
                    aggregate_type: aggregate.aggregate_type().clone(),
                    expected,
                    actual: scope_latest,
                });
            }

            for pending in aggregate.events() {
                sequence = sequence.next();
                committed.push(Event {
                    event_id: EventId::new(),
                    event_type: pending.event_type.clone(),
                    aggregate_id: aggregate.id().clone(),
                    aggregate_type: aggregate.aggregate_type().clone(),
                    sequence,
                    previous_sequence: aggregate.previous_sequence(),
                    creation_date,
                    payload: pending.payload.clone(),
                    editor_user: aggregate.editor_user().to_string(),
                    editor_service: aggregate.editor_service().to_string(),
                    resource_owner: aggregate.resource_owner().to_string(),
                });
            }
        }

        store.extend(committed.iter().cloned());

        self.reporter.add_count(PUSH_TOTAL, 1, &[]);
        self.reporter
            .add_count(EVENTS_PUSHED_TOTAL, committed.len() as u64, &[]);
        tracing::debug!(events = committed.len(), last_sequence = %sequence, "push committed");

        Ok(committed)
    }

    #[tracing::instrument(skip_all)]
    async fn query(&self, query: &EventQuery) -> Result<Vec<Event>> {
        let store = self.events.read().await;
        Ok(filter(&store, query))
    }

    async fn latest_sequence(&self, query: &EventQuery) -> Result<Sequence> {
        let store = self.events.read().await;
        Ok(latest(&store, query))
    }
}
