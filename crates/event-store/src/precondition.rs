//! Preconditions evaluated by the log before an aggregate is committed.

use std::sync::Arc;

use thiserror::Error;

use crate::{Event, EventQuery, Sequence};

/// Error returned by a [`Validation`] that rejects the matched events.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct PreconditionError {
    pub message: String,
}

impl PreconditionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Inspects the events matched by a precondition query.
///
/// Events arrive in ascending sequence order. On success the validation may
/// return a sequence; the log then uses it as the aggregate's concurrency
/// anchor, checked against the latest sequence of the query's scope.
pub type Validation =
    Arc<dyn Fn(&[Event]) -> Result<Option<Sequence>, PreconditionError> + Send + Sync>;

/// A query against the log plus the check its result must pass.
#[derive(Clone)]
pub struct Precondition {
    pub query: EventQuery,
    pub validation: Validation,
}

impl Precondition {
    pub fn new<F>(query: EventQuery, validation: F) -> Self
    where
        F: Fn(&[Event]) -> Result<Option<Sequence>, PreconditionError> + Send + Sync + 'static,
    {
        Self {
            query,
            validation: Arc::new(validation),
        }
    }

    /// Runs the validation against the matched events.
    pub fn validate(&self, events: &[Event]) -> Result<Option<Sequence>, PreconditionError> {
        (self.validation)(events)
    }
}

impl std::fmt::Debug for Precondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Precondition")
            .field("query", &self.query)
            .finish_non_exhaustive()
    }
}
