use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AggregateId, AggregateType, EventType};

/// Unique identifier for an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(Uuid);

impl EventId {
    /// Creates a new random event ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Position of an event in the log, used for optimistic concurrency control.
///
/// Sequences are assigned by the log at commit time from a single counter,
/// so they are strictly increasing within any scope. `0` means "no event".
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Sequence(u64);

impl Sequence {
    /// Creates a sequence from a raw value.
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the sequence of an empty scope (0).
    pub fn initial() -> Self {
        Self(0)
    }

    /// Returns the next sequence.
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    /// Returns the raw sequence value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for Sequence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Sequence {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// An immutable fact persisted in the log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Unique identifier for this event.
    pub event_id: EventId,

    /// The type of the event (e.g., "org.added", "org.name.reserved").
    pub event_type: EventType,

    /// The aggregate this event belongs to.
    pub aggregate_id: AggregateId,

    /// The type of aggregate (e.g., "org", "org.name.unique").
    pub aggregate_type: AggregateType,

    /// Position assigned by the log at commit time.
    pub sequence: Sequence,

    /// The anchor the pushing aggregate carried, if any.
    pub previous_sequence: Option<Sequence>,

    /// When the log committed the event.
    pub creation_date: DateTime<Utc>,

    /// The event payload as JSON.
    pub payload: serde_json::Value,

    /// The user who caused the event.
    pub editor_user: String,

    /// The service that created the event.
    pub editor_service: String,

    /// The tenant owning the aggregate.
    pub resource_owner: String,
}

impl Event {
    /// Deserializes the payload into a concrete type.
    pub fn data<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.payload.clone())
    }
}
