//! Domain layer of the IAM event-sourcing core.
//!
//! This crate provides:
//! - DomainEvent and the aggregate builders stamping events with identity
//! - ReadModel, folding committed events into current state
//! - CommandHandler, running load/push/reduce against the event log
//! - Org command handlers with uniqueness reservations, and OrgService
//! - IAM membership with IamService
//! - the UserGrant entity and its predicates

pub mod aggregate;
pub mod command;
pub mod config;
pub mod error;
pub mod iam;
pub mod org;
pub mod read_model;
pub mod telemetry;
pub mod user_grant;

pub use aggregate::{AggregateCreator, AggregateExt, DeferredAggregate, DomainEvent};
pub use command::CommandHandler;
pub use config::Config;
pub use error::{DomainError, PartialBatch};
pub use iam::{IamMember, IamMemberWriteModel, IamReadModel, IamService};
pub use org::{Org, OrgReadModel, OrgService, OrgState};
pub use read_model::{ReadModel, WriteModel};
pub use user_grant::{UserGrant, UserGrantState};
