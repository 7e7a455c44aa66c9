use crate::{AggregateId, AggregateType, Event, EventType, Sequence};

/// Builder for constructing event queries.
///
/// Allows filtering events by aggregate type, aggregate ID, event type,
/// resource owner and sequence. Each list filter matches any of its values;
/// an empty list matches everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventQuery {
    /// Filter by aggregate types (any of these).
    pub aggregate_types: Vec<AggregateType>,

    /// Filter by aggregate IDs (any of these).
    pub aggregate_ids: Vec<AggregateId>,

    /// Filter by event types (any of these).
    pub event_types: Vec<EventType>,

    /// Filter by owning tenant.
    pub resource_owner: Option<String>,

    /// Only events with a greater sequence (exclusive).
    pub after_sequence: Option<Sequence>,

    /// Maximum number of events to return.
    pub limit: Option<usize>,
}

impl EventQuery {
    /// Creates a new empty query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a query for the stream of a specific aggregate.
    pub fn for_aggregate(aggregate_type: impl Into<AggregateType>, id: AggregateId) -> Self {
        Self {
            aggregate_types: vec![aggregate_type.into()],
            aggregate_ids: vec![id],
            ..Default::default()
        }
    }

    /// Filters by aggregate type.
    pub fn aggregate_type(mut self, aggregate_type: impl Into<AggregateType>) -> Self {
        self.aggregate_types.push(aggregate_type.into());
        self
    }

    /// Filters by aggregate ID.
    pub fn aggregate_id(mut self, id: AggregateId) -> Self {
        self.aggregate_ids.push(id);
        self
    }

    /// Filters by event type.
    pub fn event_type(mut self, event_type: impl Into<EventType>) -> Self {
        self.event_types.push(event_type.into());
        self
    }

    /// Filters by multiple event types (any of these).
    pub fn event_types<T: Into<EventType>>(mut self, event_types: impl IntoIterator<Item = T>) -> Self {
        self.event_types
            .extend(event_types.into_iter().map(Into::into));
        self
    }

    /// Filters by owning tenant.
    pub fn resource_owner(mut self, resource_owner: impl Into<String>) -> Self {
        self.resource_owner = Some(resource_owner.into());
        self
    }

    /// Filters to events after this sequence (exclusive).
    pub fn after_sequence(mut self, sequence: Sequence) -> Self {
        self.after_sequence = Some(sequence);
        self
    }

    /// Limits the number of events returned.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Returns true if the event satisfies every filter of this query.
    ///
    /// `limit` is not a per-event filter and is ignored here.
    pub fn matches(&self, event: &Event) -> bool {
        if !self.aggregate_types.is_empty() && !self.aggregate_types.contains(&event.aggregate_type)
        {
            return false;
        }
        if !self.aggregate_ids.is_empty() && !self.aggregate_ids.contains(&event.aggregate_id) {
            return false;
        }
        if !self.event_types.is_empty() && !self.event_types.contains(&event.event_type) {
            return false;
        }
        if let Some(ref owner) = self.resource_owner
            && &event.resource_owner != owner
        {
            return false;
        }
        if let Some(after) = self.after_sequence
            && event.sequence <= after
        {
            return false;
        }
        true
    }
}
