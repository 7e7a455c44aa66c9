use event_store::{AggregateId, Event, EventQuery};

use super::events::{ORG_AGGREGATE_TYPE, OrgEvent};
use super::{Org, OrgState};
use crate::aggregate::DomainEvent;
use crate::error::DomainError;
use crate::read_model::{ReadModel, WriteModel};

/// Current state of one org, folded from its own stream.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrgReadModel {
    write_model: WriteModel,
    pub name: String,
    pub domain: String,
    pub state: OrgState,
}

impl OrgReadModel {
    pub fn new(aggregate_id: AggregateId) -> Self {
        Self {
            write_model: WriteModel::new(aggregate_id),
            ..Default::default()
        }
    }

    pub fn aggregate_id(&self) -> &AggregateId {
        &self.write_model.aggregate_id
    }

    /// Returns the org, or `None` if no event was folded yet.
    pub fn to_org(&self) -> Option<Org> {
        if self.processed_sequence().as_u64() == 0 {
            return None;
        }
        Some(Org {
            aggregate_id: self.write_model.aggregate_id.clone(),
            sequence: self.processed_sequence(),
            name: self.name.clone(),
            domain: self.domain.clone(),
            state: self.state,
        })
    }
}

impl ReadModel for OrgReadModel {
    fn write_model(&self) -> &WriteModel {
        &self.write_model
    }

    fn write_model_mut(&mut self) -> &mut WriteModel {
        &mut self.write_model
    }

    fn query(&self) -> EventQuery {
        EventQuery::for_aggregate(ORG_AGGREGATE_TYPE, self.write_model.aggregate_id.clone())
    }

    fn apply(&mut self, event: &Event) -> Result<(), DomainError> {
        let Some(event) = OrgEvent::from_event(event)? else {
            return Ok(());
        };
        match event {
            OrgEvent::Added(data) => {
                self.name = data.name;
                self.domain = data.domain;
                self.state = OrgState::Active;
            }
            OrgEvent::NameChanged(data) => self.name = data.name,
            OrgEvent::DomainChanged(data) => self.domain = data.domain,
            OrgEvent::Deactivated => self.state = OrgState::Inactive,
            OrgEvent::Reactivated => self.state = OrgState::Active,
            OrgEvent::Removed => self.state = OrgState::Removed,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use event_store::{EventId, Sequence};

    use super::*;

    fn event(org_event: OrgEvent, sequence: u64) -> Event {
        Event {
            event_id: EventId::new(),
            event_type: org_event.event_type().into(),
            aggregate_id: "org-1".into(),
            aggregate_type: ORG_AGGREGATE_TYPE.into(),
            sequence: Sequence::new(sequence),
            previous_sequence: None,
            creation_date: Utc::now(),
            payload: org_event.payload().unwrap(),
            editor_user: "user".to_string(),
            editor_service: "test".to_string(),
            resource_owner: "tenant".to_string(),
        }
    }

    #[test]
    fn empty_model_has_no_org() {
        assert_eq!(OrgReadModel::new("org-1".into()).to_org(), None);
    }

    #[test]
    fn folds_lifecycle() {
        let mut model = OrgReadModel::new("org-1".into());
        model
            .append_and_reduce(vec![
                event(OrgEvent::added("coas", "caos.swiss"), 1),
                event(OrgEvent::name_changed("caos"), 3),
                event(OrgEvent::domain_changed("caos.ch"), 4),
                event(OrgEvent::Deactivated, 7),
            ])
            .unwrap();

        let org = model.to_org().unwrap();
        assert_eq!(org.name, "caos");
        assert_eq!(org.domain, "caos.ch");
        assert_eq!(org.state, OrgState::Inactive);
        assert_eq!(org.sequence, Sequence::new(7));
        assert_eq!(model.write_model().resource_owner, "tenant");
    }

    #[test]
    fn reduce_orders_buffered_events() {
        let mut model = OrgReadModel::new("org-1".into());
        model.append_events(vec![
            event(OrgEvent::Removed, 9),
            event(OrgEvent::added("caos", "caos.ch"), 2),
        ]);
        model.reduce().unwrap();

        assert_eq!(model.state, OrgState::Removed);
        assert_eq!(model.processed_sequence(), Sequence::new(9));
    }

    #[test]
    fn refolding_processed_event_fails() {
        let mut model = OrgReadModel::new("org-1".into());
        let added = event(OrgEvent::added("caos", "caos.ch"), 2);
        model.append_and_reduce(vec![added.clone()]).unwrap();

        let err = model.append_and_reduce(vec![added]).unwrap_err();
        assert!(err.is_internal());
        assert_eq!(model.name, "caos");
    }

    #[test]
    fn events_of_other_aggregates_are_ignored() {
        let mut model = OrgReadModel::new("org-2".into());
        model.append_events(vec![event(OrgEvent::added("caos", "caos.ch"), 1)]);

        assert_eq!(model.write_model().pending_len(), 0);
    }
}
