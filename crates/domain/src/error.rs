//! Domain error types.

use event_store::{Aggregate, AggregateId, AggregateType, EventStoreError, Sequence};
use thiserror::Error;

/// Errors that can occur during domain operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A required input is missing, a value is already reserved, or the
    /// command would change nothing.
    #[error("Invariant violated: {0}")]
    InvariantViolation(String),

    /// The requested transition is already satisfied.
    #[error("Logical contradiction: {0}")]
    LogicalContradiction(String),

    /// The log moved on since the state was read; re-read and retry.
    #[error(
        "Concurrency conflict for {aggregate_type} {aggregate_id}: expected sequence {expected}, found {actual}"
    )]
    ConcurrencyConflict {
        aggregate_id: AggregateId,
        aggregate_type: AggregateType,
        expected: Sequence,
        actual: Sequence,
    },

    /// Corrupted event stream or an impossible outcome.
    #[error("Internal error: {0}")]
    Internal(String),

    /// Any other event store error.
    #[error("Event store error: {0}")]
    EventStore(EventStoreError),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DomainError {
    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, DomainError::InvariantViolation(_))
    }

    pub fn is_logical_contradiction(&self) -> bool {
        matches!(self, DomainError::LogicalContradiction(_))
    }

    pub fn is_concurrency_conflict(&self) -> bool {
        matches!(self, DomainError::ConcurrencyConflict { .. })
    }

    pub fn is_internal(&self) -> bool {
        matches!(self, DomainError::Internal(_))
    }
}

impl From<EventStoreError> for DomainError {
    fn from(e: EventStoreError) -> Self {
        match e {
            EventStoreError::PreconditionFailed { .. } => {
                DomainError::InvariantViolation(e.to_string())
            }
            EventStoreError::ConcurrencyConflict {
                aggregate_id,
                aggregate_type,
                expected,
                actual,
            } => DomainError::ConcurrencyConflict {
                aggregate_id,
                aggregate_type,
                expected,
                actual,
            },
            EventStoreError::Serialization(e) => DomainError::Serialization(e),
            other => DomainError::EventStore(other),
        }
    }
}

/// A batch whose construction failed part way.
///
/// `aggregates` holds what was built before and after the failure, for
/// diagnostics only: a batch carried by this error must never be pushed.
#[derive(Debug, Error)]
#[error("{source}")]
pub struct PartialBatch {
    pub aggregates: Vec<Aggregate>,
    pub source: DomainError,
}

impl PartialBatch {
    /// A failure before anything was built.
    pub fn empty(source: DomainError) -> Self {
        Self {
            aggregates: Vec::new(),
            source,
        }
    }
}

impl From<PartialBatch> for DomainError {
    fn from(batch: PartialBatch) -> Self {
        batch.source
    }
}

#[cfg(test)]
mod tests {
    use event_store::PreconditionError;

    use super::*;

    #[test]
    fn precondition_failure_maps_to_invariant_violation() {
        let err: DomainError = EventStoreError::PreconditionFailed {
            aggregate_id: "caos".into(),
            aggregate_type: "org.name.unique".into(),
            source: PreconditionError::new("reserved"),
        }
        .into();

        assert!(err.is_invariant_violation());
    }

    #[test]
    fn store_conflict_maps_to_concurrency_conflict() {
        let err: DomainError = EventStoreError::ConcurrencyConflict {
            aggregate_id: "org-1".into(),
            aggregate_type: "org".into(),
            expected: Sequence::new(1),
            actual: Sequence::new(2),
        }
        .into();

        assert!(err.is_concurrency_conflict());
    }

    #[test]
    fn invalid_aggregate_stays_a_store_error() {
        let err: DomainError = EventStoreError::InvalidAggregate("empty".to_string()).into();
        assert!(matches!(err, DomainError::EventStore(_)));
    }

    #[test]
    fn partial_batch_unwraps_to_its_source() {
        let batch = PartialBatch::empty(DomainError::Internal("boom".to_string()));
        assert_eq!(batch.to_string(), "Internal error: boom");

        let err: DomainError = batch.into();
        assert!(err.is_internal());
    }
}
