use thiserror::Error;

use crate::precondition::PreconditionError;
use crate::{AggregateId, AggregateType, Sequence};

/// Errors that can occur when interacting with the event store.
#[derive(Debug, Error)]
pub enum EventStoreError {
    /// An aggregate's precondition rejected the push.
    #[error("Precondition failed for {aggregate_type} {aggregate_id}: {source}")]
    PreconditionFailed {
        aggregate_id: AggregateId,
        aggregate_type: AggregateType,
        #[source]
        source: PreconditionError,
    },

    /// A concurrency conflict occurred when pushing events.
    /// The anchored sequence did not match the latest sequence of its scope.
    #[error(
        "Concurrency conflict for {aggregate_type} {aggregate_id}: expected sequence {expected}, found {actual}"
    )]
    ConcurrencyConflict {
        aggregate_id: AggregateId,
        aggregate_type: AggregateType,
        expected: Sequence,
        actual: Sequence,
    },

    /// The aggregate cannot be pushed as built.
    #[error("Invalid aggregate: {0}")]
    InvalidAggregate(String),

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for event store operations.
pub type Result<T> = std::result::Result<T, EventStoreError>;
