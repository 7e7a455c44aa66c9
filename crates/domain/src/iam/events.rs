use event_store::Event;
use serde::{Deserialize, Serialize};

use crate::aggregate::DomainEvent;

pub const IAM_AGGREGATE_TYPE: &str = "iam";

/// Events that can occur on an IAM aggregate.
#[derive(Debug, Clone, PartialEq)]
pub enum IamEvent {
    MemberAdded(MemberData),
    /// Replaces the member's roles.
    MemberChanged(MemberData),
    MemberRemoved(MemberRemovedData),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberData {
    pub user_id: String,
    pub roles: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberRemovedData {
    pub user_id: String,
}

impl IamEvent {
    pub fn member_added(user_id: impl Into<String>, roles: Vec<String>) -> Self {
        IamEvent::MemberAdded(MemberData {
            user_id: user_id.into(),
            roles,
        })
    }

    pub fn member_changed(user_id: impl Into<String>, roles: Vec<String>) -> Self {
        IamEvent::MemberChanged(MemberData {
            user_id: user_id.into(),
            roles,
        })
    }

    pub fn member_removed(user_id: impl Into<String>) -> Self {
        IamEvent::MemberRemoved(MemberRemovedData {
            user_id: user_id.into(),
        })
    }

    /// The user the event is about.
    pub fn user_id(&self) -> &str {
        match self {
            IamEvent::MemberAdded(data) | IamEvent::MemberChanged(data) => &data.user_id,
            IamEvent::MemberRemoved(data) => &data.user_id,
        }
    }
}

impl DomainEvent for IamEvent {
    fn event_type(&self) -> &'static str {
        match self {
            IamEvent::MemberAdded(_) => "iam.member.added",
            IamEvent::MemberChanged(_) => "iam.member.changed",
            IamEvent::MemberRemoved(_) => "iam.member.removed",
        }
    }

    fn payload(&self) -> Result<serde_json::Value, serde_json::Error> {
        match self {
            IamEvent::MemberAdded(data) | IamEvent::MemberChanged(data) => {
                serde_json::to_value(data)
            }
            IamEvent::MemberRemoved(data) => serde_json::to_value(data),
        }
    }

    fn from_event(event: &Event) -> Result<Option<Self>, serde_json::Error> {
        let decoded = match event.event_type.as_str() {
            "iam.member.added" => IamEvent::MemberAdded(event.data()?),
            "iam.member.changed" => IamEvent::MemberChanged(event.data()?),
            "iam.member.removed" => IamEvent::MemberRemoved(event.data()?),
            _ => return Ok(None),
        };
        Ok(Some(decoded))
    }
}
