pub mod aggregate;
pub mod error;
pub mod event;
pub mod memory;
pub mod precondition;
pub mod query;
pub mod reporter;
pub mod store;

pub use aggregate::{Aggregate, PendingEvent};
pub use common::{AggregateId, AggregateType, EventType, IdentityContext};
pub use error::{EventStoreError, Result};
pub use event::{Event, EventId, Sequence};
pub use memory::InMemoryEventStore;
pub use precondition::{Precondition, PreconditionError, Validation};
pub use query::EventQuery;
pub use reporter::{MetricsReporter, NoopReporter, Reporter};
pub use store::{EventStore, EventStoreExt};
