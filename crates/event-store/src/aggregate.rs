//! Aggregates: the unit of a push.

use serde::Serialize;

use crate::precondition::{Precondition, PreconditionError};
use crate::{AggregateId, AggregateType, Event, EventQuery, EventType, IdentityContext, Sequence};

/// An event that has not been committed yet.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingEvent {
    pub event_type: EventType,
    pub payload: serde_json::Value,
}

/// A consistency boundary submitted to the log in a single push.
///
/// Aggregates are ephemeral: built per command, pushed once, then dropped.
/// `previous_sequence` is the concurrency anchor: `Some(n)` demands that
/// the latest sequence of the aggregate's scope is `n`, `None` skips the
/// check.
#[derive(Debug, Clone)]
pub struct Aggregate {
    id: AggregateId,
    aggregate_type: AggregateType,
    resource_owner: String,
    editor_user: String,
    editor_service: String,
    previous_sequence: Option<Sequence>,
    events: Vec<PendingEvent>,
    precondition: Option<Precondition>,
}

impl Aggregate {
    /// Creates an aggregate stamped with the identity of `ctx`.
    pub fn new(
        id: AggregateId,
        aggregate_type: impl Into<AggregateType>,
        ctx: &IdentityContext,
        editor_service: impl Into<String>,
    ) -> Self {
        Self {
            id,
            aggregate_type: aggregate_type.into(),
            resource_owner: ctx.resource_owner().to_string(),
            editor_user: ctx.editor_user().to_string(),
            editor_service: editor_service.into(),
            previous_sequence: None,
            events: Vec::new(),
            precondition: None,
        }
    }

    /// Anchors the aggregate at `sequence`.
    pub fn with_previous_sequence(mut self, sequence: Sequence) -> Self {
        self.previous_sequence = Some(sequence);
        self
    }

    /// Appends a pending event with a raw JSON payload.
    pub fn push_event(mut self, event_type: impl Into<EventType>, payload: serde_json::Value) -> Self {
        self.events.push(PendingEvent {
            event_type: event_type.into(),
            payload,
        });
        self
    }

    /// Appends a pending event with a serializable payload.
    pub fn push_data<T: Serialize>(
        self,
        event_type: impl Into<EventType>,
        payload: &T,
    ) -> Result<Self, serde_json::Error> {
        let payload = serde_json::to_value(payload)?;
        Ok(self.push_event(event_type, payload))
    }

    /// Sets the precondition checked by the log before commit.
    pub fn set_precondition<F>(mut self, query: EventQuery, validation: F) -> Self
    where
        F: Fn(&[Event]) -> Result<Option<Sequence>, PreconditionError> + Send + Sync + 'static,
    {
        self.precondition = Some(Precondition::new(query, validation));
        self
    }

    /// Runs the precondition's validation against `events`.
    ///
    /// On success an anchor returned by the validation replaces
    /// `previous_sequence`. On failure the aggregate is left untouched.
    pub fn validate_precondition(&mut self, events: &[Event]) -> Result<bool, PreconditionError> {
        let Some(precondition) = &self.precondition else {
            return Ok(false);
        };
        if let Some(anchor) = precondition.validate(events)? {
            self.previous_sequence = Some(anchor);
            return Ok(true);
        }
        Ok(false)
    }

    pub fn id(&self) -> &AggregateId {
        &self.id
    }

    pub fn aggregate_type(&self) -> &AggregateType {
        &self.aggregate_type
    }

    pub fn resource_owner(&self) -> &str {
        &self.resource_owner
    }

    pub fn editor_user(&self) -> &str {
        &self.editor_user
    }

    pub fn editor_service(&self) -> &str {
        &self.editor_service
    }

    pub fn previous_sequence(&self) -> Option<Sequence> {
        self.previous_sequence
    }

    pub fn events(&self) -> &[PendingEvent] {
        &self.events
    }

    pub fn precondition(&self) -> Option<&Precondition> {
        self.precondition.as_ref()
    }

    /// Query selecting this aggregate's own stream.
    pub fn stream_query(&self) -> EventQuery {
        EventQuery::for_aggregate(self.aggregate_type.clone(), self.id.clone())
    }
}
