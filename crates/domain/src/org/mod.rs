//! Organisations: creation, changes with globally unique name and domain,
//! and the active/inactive/removed lifecycle.

mod aggregates;
mod changes;
mod events;
mod read_model;
mod service;

pub use aggregates::{
    is_reserved_validation, org_created_aggregates, org_deactivate_aggregate,
    org_reactivate_aggregate, org_remove_aggregates, org_update_aggregates,
    released_unique_aggregates, unique_domain_aggregate, unique_name_aggregate,
};
pub use changes::{FieldChange, OrgChanges, OrgField};
pub use events::{
    ORG_AGGREGATE_TYPE, ORG_DOMAIN_UNIQUE, ORG_NAME_UNIQUE, OrgAddedData, OrgDomainChangedData,
    OrgEvent, OrgNameChangedData, ReservationData, UniqueField,
};
pub use read_model::OrgReadModel;
pub use service::OrgService;

use event_store::{AggregateId, Sequence};
use serde::{Deserialize, Serialize};

/// The lifecycle state of an org.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrgState {
    #[default]
    Active,
    Inactive,
    /// Terminal.
    Removed,
}

impl OrgState {
    pub fn is_active(&self) -> bool {
        matches!(self, OrgState::Active)
    }

    pub fn is_inactive(&self) -> bool {
        matches!(self, OrgState::Inactive)
    }

    pub fn is_removed(&self) -> bool {
        matches!(self, OrgState::Removed)
    }

    /// Returns the state name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrgState::Active => "Active",
            OrgState::Inactive => "Inactive",
            OrgState::Removed => "Removed",
        }
    }
}

impl std::fmt::Display for OrgState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An organisation as seen by command handlers.
///
/// `sequence` is the sequence of the org's latest event and anchors every
/// change made from this snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Org {
    pub aggregate_id: AggregateId,
    pub sequence: Sequence,
    pub name: String,
    pub domain: String,
    pub state: OrgState,
}

impl Org {
    pub fn new(name: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            domain: domain.into(),
            ..Default::default()
        }
    }

    /// Returns true if every required field is present.
    pub fn is_valid(&self) -> bool {
        !self.name.is_empty() && !self.domain.is_empty()
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state_is_active() {
        assert_eq!(OrgState::default(), OrgState::Active);
    }

    #[test]
    fn test_state_predicates() {
        assert!(OrgState::Active.is_active());
        assert!(OrgState::Inactive.is_inactive());
        assert!(OrgState::Removed.is_removed());
        assert!(!OrgState::Removed.is_active());
    }

    #[test]
    fn test_display() {
        assert_eq!(OrgState::Active.to_string(), "Active");
        assert_eq!(OrgState::Inactive.to_string(), "Inactive");
        assert_eq!(OrgState::Removed.to_string(), "Removed");
    }

    #[test]
    fn test_org_validity() {
        assert!(Org::new("caos", "caos.ch").is_valid());
        assert!(!Org::new("", "caos.ch").is_valid());
        assert!(!Org::new("caos", "").is_valid());
    }
}
