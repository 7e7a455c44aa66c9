//! Building aggregates from domain events.

use event_store::{
    Aggregate, AggregateId, Event, IdentityContext, PendingEvent, Sequence,
};

use crate::config::Config;
use crate::error::DomainError;

/// Trait for domain events.
///
/// Domain events represent facts that have happened in the domain. The event
/// type travels next to the payload in the log, so implementations
/// serialize only their data.
pub trait DomainEvent: Sized {
    /// Returns the event type name.
    fn event_type(&self) -> &'static str;

    /// Serializes the event's data.
    fn payload(&self) -> Result<serde_json::Value, serde_json::Error>;

    /// Decodes a logged event, returning `None` for event types this domain
    /// event does not cover.
    fn from_event(event: &Event) -> Result<Option<Self>, serde_json::Error>;
}

/// Extension for pushing domain events onto aggregates.
pub trait AggregateExt: Sized {
    fn push<E: DomainEvent>(self, event: &E) -> Result<Self, DomainError>;
}

impl AggregateExt for Aggregate {
    fn push<E: DomainEvent>(self, event: &E) -> Result<Self, DomainError> {
        Ok(self.push_event(event.event_type(), event.payload()?))
    }
}

/// Creates aggregates stamped with the editing service's name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateCreator {
    editor_service: String,
}

impl AggregateCreator {
    pub fn new(editor_service: impl Into<String>) -> Self {
        Self {
            editor_service: editor_service.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.editor_service.clone())
    }

    pub fn editor_service(&self) -> &str {
        &self.editor_service
    }

    /// Creates an empty aggregate for `ctx`.
    pub fn new_aggregate(
        &self,
        ctx: &IdentityContext,
        id: &AggregateId,
        aggregate_type: &'static str,
        previous_sequence: Option<Sequence>,
    ) -> Result<Aggregate, DomainError> {
        if id.is_empty() {
            return Err(DomainError::InvariantViolation(format!(
                "{aggregate_type} aggregate requires an id"
            )));
        }
        let aggregate = Aggregate::new(id.clone(), aggregate_type, ctx, self.editor_service.as_str());
        Ok(match previous_sequence {
            Some(sequence) => aggregate.with_previous_sequence(sequence),
            None => aggregate,
        })
    }
}

/// An aggregate whose state checks already passed, waiting for the
/// identity context that stamps it.
#[derive(Debug, Clone)]
pub struct DeferredAggregate {
    creator: AggregateCreator,
    aggregate_id: AggregateId,
    aggregate_type: &'static str,
    previous_sequence: Option<Sequence>,
    events: Vec<PendingEvent>,
}

impl DeferredAggregate {
    pub fn new(
        creator: &AggregateCreator,
        aggregate_id: AggregateId,
        aggregate_type: &'static str,
        previous_sequence: Option<Sequence>,
    ) -> Self {
        Self {
            creator: creator.clone(),
            aggregate_id,
            aggregate_type,
            previous_sequence,
            events: Vec::new(),
        }
    }

    pub fn push<E: DomainEvent>(mut self, event: &E) -> Result<Self, DomainError> {
        self.events.push(PendingEvent {
            event_type: event.event_type().into(),
            payload: event.payload()?,
        });
        Ok(self)
    }

    pub fn aggregate_id(&self) -> &AggregateId {
        &self.aggregate_id
    }

    pub fn previous_sequence(&self) -> Option<Sequence> {
        self.previous_sequence
    }

    pub fn events(&self) -> &[PendingEvent] {
        &self.events
    }

    /// Builds the aggregate for `ctx`.
    pub fn realize(&self, ctx: &IdentityContext) -> Result<Aggregate, DomainError> {
        let aggregate = self.creator.new_aggregate(
            ctx,
            &self.aggregate_id,
            self.aggregate_type,
            self.previous_sequence,
        )?;
        Ok(self.events.iter().fold(aggregate, |aggregate, pending| {
            aggregate.push_event(pending.event_type.clone(), pending.payload.clone())
        }))
    }
}
