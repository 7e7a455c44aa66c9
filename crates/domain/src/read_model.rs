//! Folding persisted events into current state.

use chrono::{DateTime, Utc};
use event_store::{AggregateId, Event, EventQuery, Sequence};

use crate::error::DomainError;

/// Bookkeeping shared by every read/write model.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteModel {
    pub aggregate_id: AggregateId,
    /// Sequence of the last folded event.
    pub processed_sequence: Sequence,
    pub resource_owner: String,
    pub creation_date: Option<DateTime<Utc>>,
    pub change_date: Option<DateTime<Utc>>,
    pending: Vec<Event>,
}

impl WriteModel {
    pub fn new(aggregate_id: AggregateId) -> Self {
        Self {
            aggregate_id,
            ..Default::default()
        }
    }

    /// Number of events waiting to be reduced.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

/// A projection of one aggregate folded from its events.
///
/// Events are appended to a pending buffer first and folded by
/// [`ReadModel::reduce`] in ascending sequence order. An event whose
/// sequence is not strictly greater than the processed sequence signals a
/// corrupted stream and fails the reduction.
pub trait ReadModel {
    fn write_model(&self) -> &WriteModel;

    fn write_model_mut(&mut self) -> &mut WriteModel;

    /// Query selecting the events this model folds.
    fn query(&self) -> EventQuery;

    /// Folds a single event into the domain fields.
    fn apply(&mut self, event: &Event) -> Result<(), DomainError>;

    fn processed_sequence(&self) -> Sequence {
        self.write_model().processed_sequence
    }

    /// Buffers events for the next reduction.
    ///
    /// Events outside [`ReadModel::query`] are dropped, so a whole push
    /// result can be handed over.
    fn append_events(&mut self, events: impl IntoIterator<Item = Event>)
    where
        Self: Sized,
    {
        let query = self.query();
        self.write_model_mut()
            .pending
            .extend(events.into_iter().filter(|e| query.matches(e)));
    }

    /// Folds the buffered events and clears the buffer.
    ///
    /// Nothing is folded if any buffered event is out of order. If applying
    /// an event fails, the events before it stay folded and the failing
    /// event and its successors are kept in the buffer.
    fn reduce(&mut self) -> Result<(), DomainError>
    where
        Self: Sized,
    {
        let mut events = std::mem::take(&mut self.write_model_mut().pending);
        events.sort_by_key(|e| e.sequence);

        let mut last = self.processed_sequence();
        for event in &events {
            if event.sequence <= last {
                return Err(DomainError::Internal(format!(
                    "event {} on {} {} has sequence {} but {} was already processed",
                    event.event_type, event.aggregate_type, event.aggregate_id, event.sequence, last
                )));
            }
            last = event.sequence;
        }

        for (i, event) in events.iter().enumerate() {
            if let Err(e) = self.apply(event) {
                // Unfolded events stay buffered for the next reduction.
                self.write_model_mut().pending = events[i..].to_vec();
                return Err(e);
            }
            let model = self.write_model_mut();
            model.processed_sequence = event.sequence;
            model.change_date = Some(event.creation_date);
            if model.creation_date.is_none() {
                model.creation_date = Some(event.creation_date);
            }
            if model.resource_owner.is_empty() {
                model.resource_owner = event.resource_owner.clone();
            }
        }

        tracing::debug!(
            aggregate_id = %self.write_model().aggregate_id,
            reduced = events.len(),
            processed_sequence = %self.processed_sequence(),
            "read model reduced"
        );
        Ok(())
    }

    fn append_and_reduce(&mut self, events: impl IntoIterator<Item = Event>) -> Result<(), DomainError>
    where
        Self: Sized,
    {
        self.append_events(events);
        self.reduce()
    }
}

#[cfg(test)]
mod tests {
    use event_store::{AggregateType, EventId};

    use super::*;

    #[derive(Debug, Default)]
    struct Counter {
        write_model: WriteModel,
        applied: Vec<u64>,
        fail_at: Option<u64>,
    }

    impl ReadModel for Counter {
        fn write_model(&self) -> &WriteModel {
            &self.write_model
        }

        fn write_model_mut(&mut self) -> &mut WriteModel {
            &mut self.write_model
        }

        fn query(&self) -> EventQuery {
            EventQuery::for_aggregate("counter", self.write_model.aggregate_id.clone())
        }

        fn apply(&mut self, event: &Event) -> Result<(), DomainError> {
            if self.fail_at == Some(event.sequence.as_u64()) {
                return Err(DomainError::Internal("undecodable".to_string()));
            }
            self.applied.push(event.sequence.as_u64());
            Ok(())
        }
    }

    fn counter() -> Counter {
        Counter {
            write_model: WriteModel::new("c".into()),
            applied: Vec::new(),
            fail_at: None,
        }
    }

    fn event(aggregate_type: &str, sequence: u64) -> Event {
        Event {
            event_id: EventId::new(),
            event_type: "counter.incremented".into(),
            aggregate_id: "c".into(),
            aggregate_type: AggregateType::new(aggregate_type),
            sequence: Sequence::new(sequence),
            previous_sequence: None,
            creation_date: Utc::now(),
            payload: serde_json::Value::Null,
            editor_user: "user".to_string(),
            editor_service: "svc".to_string(),
            resource_owner: "org".to_string(),
        }
    }

    #[test]
    fn append_does_not_fold() {
        let mut model = counter();
        model.append_events(vec![event("counter", 1)]);

        assert_eq!(model.write_model().pending_len(), 1);
        assert!(model.applied.is_empty());
        assert_eq!(model.processed_sequence(), Sequence::initial());
    }

    #[test]
    fn reduce_folds_in_sequence_order_and_clears_buffer() {
        let mut model = counter();
        model.append_events(vec![event("counter", 3)]);
        model.append_events(vec![event("counter", 1), event("counter", 2)]);

        model.reduce().unwrap();

        assert_eq!(model.applied, vec![1, 2, 3]);
        assert_eq!(model.processed_sequence(), Sequence::new(3));
        assert_eq!(model.write_model().pending_len(), 0);
        assert_eq!(model.write_model().resource_owner, "org");
        assert!(model.write_model().creation_date.is_some());
    }

    #[test]
    fn append_ignores_events_outside_query() {
        let mut model = counter();
        model.append_and_reduce(vec![event("counter", 1), event("other", 2)]).unwrap();

        assert_eq!(model.applied, vec![1]);
        assert_eq!(model.processed_sequence(), Sequence::new(1));
    }

    #[test]
    fn folding_processed_sequence_again_fails() {
        let mut model = counter();
        model.append_and_reduce(vec![event("counter", 1)]).unwrap();

        let result = model.append_and_reduce(vec![event("counter", 1)]);

        assert!(result.unwrap_err().is_internal());
        assert_eq!(model.applied, vec![1]);
    }

    #[test]
    fn duplicate_in_buffer_fails_without_folding() {
        let mut model = counter();

        let result = model.append_and_reduce(vec![event("counter", 2), event("counter", 2)]);

        assert!(result.unwrap_err().is_internal());
        assert!(model.applied.is_empty());
        assert_eq!(model.processed_sequence(), Sequence::initial());
    }

    #[test]
    fn failed_apply_keeps_unfolded_events_buffered() {
        let mut model = counter();
        model.fail_at = Some(2);

        let result = model.append_and_reduce(vec![
            event("counter", 1),
            event("counter", 2),
            event("counter", 3),
        ]);

        assert!(result.unwrap_err().is_internal());
        assert_eq!(model.applied, vec![1]);
        assert_eq!(model.processed_sequence(), Sequence::new(1));
        assert_eq!(model.write_model().pending_len(), 2);

        model.fail_at = None;
        model.reduce().unwrap();
        assert_eq!(model.applied, vec![1, 2, 3]);
        assert_eq!(model.write_model().pending_len(), 0);
    }
}
