//! IAM service managing the members of an IAM instance.

use event_store::{AggregateId, EventStore, IdentityContext};

use super::events::{IAM_AGGREGATE_TYPE, IamEvent};
use super::read_model::{IamMemberWriteModel, IamReadModel};
use super::IamMember;
use crate::aggregate::{AggregateCreator, AggregateExt};
use crate::command::CommandHandler;
use crate::error::DomainError;
use crate::read_model::ReadModel;

pub struct IamService<S: EventStore> {
    handler: CommandHandler<S>,
    creator: AggregateCreator,
}

impl<S: EventStore> IamService<S> {
    pub fn new(store: S, creator: AggregateCreator) -> Self {
        Self {
            handler: CommandHandler::new(store),
            creator,
        }
    }

    pub fn handler(&self) -> &CommandHandler<S> {
        &self.handler
    }

    #[tracing::instrument(skip(self))]
    pub async fn iam_by_id(&self, iam_id: &AggregateId) -> Result<IamReadModel, DomainError> {
        let mut model = IamReadModel::new(iam_id.clone());
        self.handler.load(&mut model).await?;
        Ok(model)
    }

    /// Adds a member that does not exist yet.
    #[tracing::instrument(skip(self))]
    pub async fn add_member(
        &self,
        ctx: &IdentityContext,
        member: IamMember,
    ) -> Result<IamMember, DomainError> {
        if !member.is_valid() {
            return Err(DomainError::InvariantViolation(
                "member requires an iam, a user and roles".to_string(),
            ));
        }
        let mut iam = self.iam_by_id(&member.iam_id).await?;
        if iam.member_by_user_id(&member.user_id).is_some() {
            return Err(DomainError::InvariantViolation(format!(
                "user {} is already a member of {}",
                member.user_id, member.iam_id
            )));
        }

        let aggregate = self
            .creator
            .new_aggregate(
                ctx,
                &member.iam_id,
                IAM_AGGREGATE_TYPE,
                Some(iam.processed_sequence()),
            )?
            .push(&IamEvent::member_added(&member.user_id, member.roles.clone()))?;
        self.handler.execute(vec![aggregate], &mut iam).await?;

        iam.member_by_user_id(&member.user_id)
            .cloned()
            .ok_or_else(|| {
                DomainError::Internal(format!("member {} not saved", member.user_id))
            })
    }

    /// Replaces the roles of an existing member.
    #[tracing::instrument(skip(self))]
    pub async fn change_member(
        &self,
        ctx: &IdentityContext,
        member: IamMember,
    ) -> Result<IamMember, DomainError> {
        if !member.is_valid() {
            return Err(DomainError::InvariantViolation(
                "member requires an iam, a user and roles".to_string(),
            ));
        }
        let mut existing = IamMemberWriteModel::new(member.iam_id.clone(), &member.user_id);
        self.handler.load(&mut existing).await?;
        if !existing.exists {
            return Err(DomainError::InvariantViolation(format!(
                "user {} is not a member of {}",
                member.user_id, member.iam_id
            )));
        }
        if existing.roles == member.roles {
            return Err(DomainError::InvariantViolation(format!(
                "roles of member {} have not been changed",
                member.user_id
            )));
        }

        let aggregate = self
            .creator
            .new_aggregate(
                ctx,
                &member.iam_id,
                IAM_AGGREGATE_TYPE,
                Some(existing.processed_sequence()),
            )?
            .push(&IamEvent::member_changed(&member.user_id, member.roles.clone()))?;
        self.handler.execute(vec![aggregate], &mut existing).await?;

        existing.to_member().ok_or_else(|| {
            DomainError::Internal(format!("member {} not saved", member.user_id))
        })
    }

    /// Removes a member. Removing a user who is not a member does nothing.
    #[tracing::instrument(skip(self))]
    pub async fn remove_member(
        &self,
        ctx: &IdentityContext,
        iam_id: &AggregateId,
        user_id: &str,
    ) -> Result<(), DomainError> {
        let mut iam = self.iam_by_id(iam_id).await?;
        if iam.member_by_user_id(user_id).is_none() {
            return Ok(());
        }

        let aggregate = self
            .creator
            .new_aggregate(ctx, iam_id, IAM_AGGREGATE_TYPE, Some(iam.processed_sequence()))?
            .push(&IamEvent::member_removed(user_id))?;
        self.handler.execute(vec![aggregate], &mut iam).await?;
        Ok(())
    }
}
