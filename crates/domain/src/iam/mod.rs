//! IAM membership: which users hold which roles on an IAM instance.

mod events;
mod read_model;
mod service;

pub use events::{IAM_AGGREGATE_TYPE, IamEvent, MemberData, MemberRemovedData};
pub use read_model::{IamMemberWriteModel, IamReadModel};
pub use service::IamService;

use event_store::AggregateId;
use serde::{Deserialize, Serialize};

/// A user granted roles on an IAM instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IamMember {
    pub iam_id: AggregateId,
    pub user_id: String,
    pub roles: Vec<String>,
}

impl IamMember {
    pub fn new(iam_id: AggregateId, user_id: impl Into<String>, roles: Vec<String>) -> Self {
        Self {
            iam_id,
            user_id: user_id.into(),
            roles,
        }
    }

    /// Returns true if the member names its IAM, its user and at least one
    /// role.
    pub fn is_valid(&self) -> bool {
        !self.iam_id.is_empty() && !self.user_id.is_empty() && !self.roles.is_empty()
    }
}
