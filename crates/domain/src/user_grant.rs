//! User grants: roles of a user on a project.

use event_store::AggregateId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum UserGrantState {
    #[default]
    Active,
    Inactive,
    Removed,
}

/// Role keys granted to a user on a project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserGrant {
    pub aggregate_id: AggregateId,
    pub state: UserGrantState,
    pub user_id: String,
    pub project_id: String,
    pub role_keys: Vec<String>,
}

impl UserGrant {
    pub fn new(user_id: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            project_id: project_id.into(),
            ..Default::default()
        }
    }

    /// Returns true if the grant names its user and project. Role keys are
    /// optional.
    pub fn is_valid(&self) -> bool {
        !self.project_id.is_empty() && !self.user_id.is_empty()
    }

    pub fn is_active(&self) -> bool {
        self.state == UserGrantState::Active
    }

    pub fn is_inactive(&self) -> bool {
        self.state == UserGrantState::Inactive
    }
}
