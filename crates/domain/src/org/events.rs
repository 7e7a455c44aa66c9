//! Org domain events and uniqueness reservations.

use event_store::{AggregateId, Event};
use serde::{Deserialize, Serialize};

use crate::aggregate::DomainEvent;

pub const ORG_AGGREGATE_TYPE: &str = "org";

/// Events that can occur on an org aggregate.
#[derive(Debug, Clone, PartialEq)]
pub enum OrgEvent {
    /// Org was created.
    Added(OrgAddedData),

    /// Org name was changed.
    NameChanged(OrgNameChangedData),

    /// Org domain was changed.
    DomainChanged(OrgDomainChangedData),

    Deactivated,

    Reactivated,

    Removed,
}

impl DomainEvent for OrgEvent {
    fn event_type(&self) -> &'static str {
        match self {
            OrgEvent::Added(_) => "org.added",
            OrgEvent::NameChanged(_) => "org.name.changed",
            OrgEvent::DomainChanged(_) => "org.domain.changed",
            OrgEvent::Deactivated => "org.deactivated",
            OrgEvent::Reactivated => "org.reactivated",
            OrgEvent::Removed => "org.removed",
        }
    }

    fn payload(&self) -> Result<serde_json::Value, serde_json::Error> {
        match self {
            OrgEvent::Added(data) => serde_json::to_value(data),
            OrgEvent::NameChanged(data) => serde_json::to_value(data),
            OrgEvent::DomainChanged(data) => serde_json::to_value(data),
            OrgEvent::Deactivated | OrgEvent::Reactivated | OrgEvent::Removed => {
                Ok(serde_json::json!({}))
            }
        }
    }

    fn from_event(event: &Event) -> Result<Option<Self>, serde_json::Error> {
        let decoded = match event.event_type.as_str() {
            "org.added" => OrgEvent::Added(event.data()?),
            "org.name.changed" => OrgEvent::NameChanged(event.data()?),
            "org.domain.changed" => OrgEvent::DomainChanged(event.data()?),
            "org.deactivated" => OrgEvent::Deactivated,
            "org.reactivated" => OrgEvent::Reactivated,
            "org.removed" => OrgEvent::Removed,
            _ => return Ok(None),
        };
        Ok(Some(decoded))
    }
}

/// Data for the org added event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrgAddedData {
    pub name: String,
    pub domain: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrgNameChangedData {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrgDomainChangedData {
    pub domain: String,
}

// Convenience constructors for events
impl OrgEvent {
    pub fn added(name: impl Into<String>, domain: impl Into<String>) -> Self {
        OrgEvent::Added(OrgAddedData {
            name: name.into(),
            domain: domain.into(),
        })
    }

    pub fn name_changed(name: impl Into<String>) -> Self {
        OrgEvent::NameChanged(OrgNameChangedData { name: name.into() })
    }

    pub fn domain_changed(domain: impl Into<String>) -> Self {
        OrgEvent::DomainChanged(OrgDomainChangedData {
            domain: domain.into(),
        })
    }
}

/// A globally unique org field, tracked by a reservation aggregate per value.
///
/// The reserved value is the reservation aggregate's id; its newest
/// reserved/released event decides whether the value is currently held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniqueField {
    pub aggregate_type: &'static str,
    pub reserved: &'static str,
    pub released: &'static str,
    pub label: &'static str,
}

pub const ORG_NAME_UNIQUE: UniqueField = UniqueField {
    aggregate_type: "org.name.unique",
    reserved: "org.name.reserved",
    released: "org.name.released",
    label: "org name",
};

pub const ORG_DOMAIN_UNIQUE: UniqueField = UniqueField {
    aggregate_type: "org.domain.unique",
    reserved: "org.domain.reserved",
    released: "org.domain.released",
    label: "org domain",
};

/// Payload of reservation and release events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReservationData {
    pub org_id: AggregateId,
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use event_store::{EventId, Sequence};

    use super::*;

    fn logged(event: &OrgEvent) -> Event {
        Event {
            event_id: EventId::new(),
            event_type: event.event_type().into(),
            aggregate_id: "org-1".into(),
            aggregate_type: ORG_AGGREGATE_TYPE.into(),
            sequence: Sequence::new(1),
            previous_sequence: None,
            creation_date: Utc::now(),
            payload: event.payload().unwrap(),
            editor_user: "user".to_string(),
            editor_service: "svc".to_string(),
            resource_owner: "org".to_string(),
        }
    }

    #[test]
    fn test_event_type() {
        assert_eq!(OrgEvent::added("caos", "caos.ch").event_type(), "org.added");
        assert_eq!(OrgEvent::name_changed("caos").event_type(), "org.name.changed");
        assert_eq!(OrgEvent::domain_changed("caos.ch").event_type(), "org.domain.changed");
        assert_eq!(OrgEvent::Deactivated.event_type(), "org.deactivated");
        assert_eq!(OrgEvent::Reactivated.event_type(), "org.reactivated");
        assert_eq!(OrgEvent::Removed.event_type(), "org.removed");
    }

    #[test]
    fn test_logged_event_decodes() {
        let event = OrgEvent::added("caos", "caos.ch");
        let decoded = OrgEvent::from_event(&logged(&event)).unwrap();
        assert_eq!(decoded, Some(event));

        let decoded = OrgEvent::from_event(&logged(&OrgEvent::Deactivated)).unwrap();
        assert_eq!(decoded, Some(OrgEvent::Deactivated));
    }

    #[test]
    fn test_foreign_event_type_is_skipped() {
        let mut event = logged(&OrgEvent::Removed);
        event.event_type = ORG_NAME_UNIQUE.reserved.into();
        assert_eq!(OrgEvent::from_event(&event).unwrap(), None);
    }
}
