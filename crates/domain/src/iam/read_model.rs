use event_store::{AggregateId, Event, EventQuery};

use super::events::{IAM_AGGREGATE_TYPE, IamEvent};
use super::IamMember;
use crate::aggregate::DomainEvent;
use crate::error::DomainError;
use crate::read_model::{ReadModel, WriteModel};

/// Members of one IAM instance, in the order they were added.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IamReadModel {
    write_model: WriteModel,
    pub members: Vec<IamMember>,
}

impl IamReadModel {
    pub fn new(iam_id: AggregateId) -> Self {
        Self {
            write_model: WriteModel::new(iam_id),
            ..Default::default()
        }
    }

    pub fn iam_id(&self) -> &AggregateId {
        &self.write_model.aggregate_id
    }

    pub fn member_by_user_id(&self, user_id: &str) -> Option<&IamMember> {
        self.members.iter().find(|m| m.user_id == user_id)
    }
}

impl ReadModel for IamReadModel {
    fn write_model(&self) -> &WriteModel {
        &self.write_model
    }

    fn write_model_mut(&mut self) -> &mut WriteModel {
        &mut self.write_model
    }

    fn query(&self) -> EventQuery {
        EventQuery::for_aggregate(IAM_AGGREGATE_TYPE, self.write_model.aggregate_id.clone())
    }

    fn apply(&mut self, event: &Event) -> Result<(), DomainError> {
        match IamEvent::from_event(event)? {
            Some(IamEvent::MemberAdded(data)) => {
                self.members.retain(|m| m.user_id != data.user_id);
                self.members.push(IamMember::new(
                    self.write_model.aggregate_id.clone(),
                    data.user_id,
                    data.roles,
                ));
            }
            Some(IamEvent::MemberChanged(data)) => {
                if let Some(member) = self.members.iter_mut().find(|m| m.user_id == data.user_id) {
                    member.roles = data.roles;
                }
            }
            Some(IamEvent::MemberRemoved(data)) => {
                self.members.retain(|m| m.user_id != data.user_id);
            }
            None => {}
        }
        Ok(())
    }
}

/// One member of an IAM instance.
///
/// Folds the whole IAM stream so the processed sequence can anchor a change
/// of this member.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IamMemberWriteModel {
    write_model: WriteModel,
    pub user_id: String,
    pub roles: Vec<String>,
    pub exists: bool,
}

impl IamMemberWriteModel {
    pub fn new(iam_id: AggregateId, user_id: impl Into<String>) -> Self {
        Self {
            write_model: WriteModel::new(iam_id),
            user_id: user_id.into(),
            ..Default::default()
        }
    }

    /// Returns the member, or `None` if it does not exist.
    pub fn to_member(&self) -> Option<IamMember> {
        self.exists.then(|| {
            IamMember::new(
                self.write_model.aggregate_id.clone(),
                self.user_id.clone(),
                self.roles.clone(),
            )
        })
    }
}

impl ReadModel for IamMemberWriteModel {
    fn write_model(&self) -> &WriteModel {
        &self.write_model
    }

    fn write_model_mut(&mut self) -> &mut WriteModel {
        &mut self.write_model
    }

    fn query(&self) -> EventQuery {
        EventQuery::for_aggregate(IAM_AGGREGATE_TYPE, self.write_model.aggregate_id.clone())
    }

    fn apply(&mut self, event: &Event) -> Result<(), DomainError> {
        let Some(event) = IamEvent::from_event(event)? else {
            return Ok(());
        };
        if event.user_id() != self.user_id {
            return Ok(());
        }
        match event {
            IamEvent::MemberAdded(data) | IamEvent::MemberChanged(data) => {
                self.roles = data.roles;
                self.exists = true;
            }
            IamEvent::MemberRemoved(_) => {
                self.roles.clear();
                self.exists = false;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use event_store::{EventId, Sequence};

    use super::*;

    fn event(iam_event: IamEvent, sequence: u64) -> Event {
        Event {
            event_id: EventId::new(),
            event_type: iam_event.event_type().into(),
            aggregate_id: "iam".into(),
            aggregate_type: IAM_AGGREGATE_TYPE.into(),
            sequence: Sequence::new(sequence),
            previous_sequence: None,
            creation_date: Utc::now(),
            payload: iam_event.payload().unwrap(),
            editor_user: "user".to_string(),
            editor_service: "test".to_string(),
            resource_owner: "tenant".to_string(),
        }
    }

    fn roles(roles: &[&str]) -> Vec<String> {
        roles.iter().map(|r| r.to_string()).collect()
    }

    fn history() -> Vec<Event> {
        vec![
            event(IamEvent::member_added("alice", roles(&["IAM_OWNER"])), 1),
            event(IamEvent::member_added("bob", roles(&["IAM_VIEWER"])), 2),
            event(IamEvent::member_changed("bob", roles(&["IAM_EDITOR"])), 3),
            event(IamEvent::member_removed("alice"), 4),
        ]
    }

    #[test]
    fn read_model_tracks_members() {
        let mut model = IamReadModel::new("iam".into());
        model.append_and_reduce(history()).unwrap();

        assert!(model.member_by_user_id("alice").is_none());
        let bob = model.member_by_user_id("bob").unwrap();
        assert_eq!(bob.roles, roles(&["IAM_EDITOR"]));
        assert_eq!(bob.iam_id.as_str(), "iam");
        assert_eq!(model.processed_sequence(), Sequence::new(4));
    }

    #[test]
    fn write_model_follows_one_member() {
        let mut bob = IamMemberWriteModel::new("iam".into(), "bob");
        bob.append_and_reduce(history()).unwrap();

        assert_eq!(bob.to_member().unwrap().roles, roles(&["IAM_EDITOR"]));
        assert_eq!(bob.processed_sequence(), Sequence::new(4));

        let mut alice = IamMemberWriteModel::new("iam".into(), "alice");
        alice.append_and_reduce(history()).unwrap();
        assert_eq!(alice.to_member(), None);
    }
}
