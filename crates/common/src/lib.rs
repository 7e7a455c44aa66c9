//! Identity types shared across the IAM event-sourcing crates.

pub mod context;
pub mod types;

pub use context::IdentityContext;
pub use types::{AggregateId, AggregateType, EventType};
