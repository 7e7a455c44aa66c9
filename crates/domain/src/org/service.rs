//! Org service providing a simplified API for org operations.

use event_store::{AggregateId, EventStore, IdentityContext};

use super::aggregates::{
    org_created_aggregates, org_deactivate_aggregate, org_reactivate_aggregate,
    org_remove_aggregates, org_update_aggregates, released_unique_aggregates,
};
use super::read_model::OrgReadModel;
use super::Org;
use crate::aggregate::{AggregateCreator, DeferredAggregate};
use crate::command::CommandHandler;
use crate::error::DomainError;

/// Service for managing orgs.
///
/// Every operation rehydrates the org, builds its aggregates, pushes them as
/// one batch and folds the committed events back before answering.
pub struct OrgService<S: EventStore> {
    handler: CommandHandler<S>,
    creator: AggregateCreator,
}

impl<S: EventStore> OrgService<S> {
    pub fn new(store: S, creator: AggregateCreator) -> Self {
        Self {
            handler: CommandHandler::new(store),
            creator,
        }
    }

    /// Returns a reference to the underlying command handler.
    pub fn handler(&self) -> &CommandHandler<S> {
        &self.handler
    }

    async fn read_model(&self, id: &AggregateId) -> Result<OrgReadModel, DomainError> {
        let mut model = OrgReadModel::new(id.clone());
        self.handler.load(&mut model).await?;
        Ok(model)
    }

    /// Creates an org and reserves its name and domain.
    ///
    /// An empty id is replaced by a generated one.
    #[tracing::instrument(skip(self))]
    pub async fn create_org(&self, ctx: &IdentityContext, mut org: Org) -> Result<Org, DomainError> {
        if !org.is_valid() {
            return Err(DomainError::InvariantViolation(
                "org requires a name and a domain".to_string(),
            ));
        }
        if org.aggregate_id.is_empty() {
            org.aggregate_id = AggregateId::generate();
        }

        let aggregates = org_created_aggregates(ctx, &self.creator, Some(&org))?;
        let mut model = OrgReadModel::new(org.aggregate_id.clone());
        self.handler.execute(aggregates, &mut model).await?;

        model
            .to_org()
            .ok_or_else(|| DomainError::Internal(format!("org {} not created", org.aggregate_id)))
    }

    #[tracing::instrument(skip(self))]
    pub async fn org_by_id(&self, id: &AggregateId) -> Result<Option<Org>, DomainError> {
        Ok(self.read_model(id).await?.to_org())
    }

    /// Changes the name and/or domain of an existing org.
    ///
    /// Reservations of the new values are claimed and the old values are
    /// released in the same batch.
    #[tracing::instrument(skip(self))]
    pub async fn change_org(&self, ctx: &IdentityContext, org: Org) -> Result<Org, DomainError> {
        let mut model = self.read_model(&org.aggregate_id).await?;
        let existing = model.to_org();
        if let Some(existing) = &existing
            && existing.state.is_removed()
        {
            return Err(DomainError::InvariantViolation(format!(
                "org {} is removed",
                existing.aggregate_id
            )));
        }

        let mut aggregates =
            org_update_aggregates(ctx, &self.creator, existing.as_ref(), Some(&org))?;
        aggregates.extend(released_unique_aggregates(
            ctx,
            &self.creator,
            existing.as_ref(),
            Some(&org),
        )?);
        self.handler.execute(aggregates, &mut model).await?;

        model
            .to_org()
            .ok_or_else(|| DomainError::Internal(format!("org {} not changed", org.aggregate_id)))
    }

    #[tracing::instrument(skip(self))]
    pub async fn deactivate_org(
        &self,
        ctx: &IdentityContext,
        id: &AggregateId,
    ) -> Result<Org, DomainError> {
        self.transition(ctx, id, org_deactivate_aggregate).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn reactivate_org(
        &self,
        ctx: &IdentityContext,
        id: &AggregateId,
    ) -> Result<Org, DomainError> {
        self.transition(ctx, id, org_reactivate_aggregate).await
    }

    async fn transition<F>(
        &self,
        ctx: &IdentityContext,
        id: &AggregateId,
        build: F,
    ) -> Result<Org, DomainError>
    where
        F: FnOnce(&AggregateCreator, Option<&Org>) -> Result<DeferredAggregate, DomainError>,
    {
        let mut model = self.read_model(id).await?;
        let deferred = build(&self.creator, model.to_org().as_ref())?;
        let aggregate = deferred.realize(ctx)?;
        self.handler.execute(vec![aggregate], &mut model).await?;

        model
            .to_org()
            .ok_or_else(|| DomainError::Internal(format!("org {id} vanished")))
    }

    /// Removes an org and releases its name and domain.
    #[tracing::instrument(skip(self))]
    pub async fn remove_org(
        &self,
        ctx: &IdentityContext,
        id: &AggregateId,
    ) -> Result<Org, DomainError> {
        let mut model = self.read_model(id).await?;
        let aggregates = org_remove_aggregates(ctx, &self.creator, model.to_org().as_ref())?;
        self.handler.execute(aggregates, &mut model).await?;

        model
            .to_org()
            .ok_or_else(|| DomainError::Internal(format!("org {id} vanished")))
    }
}

#[cfg(test)]
mod tests {
    use event_store::InMemoryEventStore;

    use super::*;
    use crate::org::OrgState;

    fn service() -> OrgService<InMemoryEventStore> {
        OrgService::new(InMemoryEventStore::new(), AggregateCreator::new("test"))
    }

    fn ctx() -> IdentityContext {
        IdentityContext::new("tenant", "user")
    }

    #[tokio::test]
    async fn test_create_org_generates_id() {
        let service = service();
        let org = service
            .create_org(&ctx(), Org::new("caos", "caos.ch"))
            .await
            .unwrap();

        assert!(!org.aggregate_id.is_empty());
        assert_eq!(org.state, OrgState::Active);

        let loaded = service.org_by_id(&org.aggregate_id).await.unwrap();
        assert_eq!(loaded, Some(org));
    }

    #[tokio::test]
    async fn test_create_invalid_org_pushes_nothing() {
        let service = service();
        let err = service
            .create_org(&ctx(), Org::new("caos", ""))
            .await
            .unwrap_err();

        assert!(err.is_invariant_violation());
        assert_eq!(service.handler().store().event_count().await, 0);
    }

    #[tokio::test]
    async fn test_unknown_org_is_none() {
        let org = service().org_by_id(&"missing".into()).await.unwrap();
        assert_eq!(org, None);
    }

    #[tokio::test]
    async fn test_deactivate_and_reactivate() {
        let service = service();
        let org = service
            .create_org(&ctx(), Org::new("caos", "caos.ch"))
            .await
            .unwrap();

        let org = service.deactivate_org(&ctx(), &org.aggregate_id).await.unwrap();
        assert_eq!(org.state, OrgState::Inactive);

        let err = service
            .deactivate_org(&ctx(), &org.aggregate_id)
            .await
            .unwrap_err();
        assert!(err.is_logical_contradiction());

        let org = service.reactivate_org(&ctx(), &org.aggregate_id).await.unwrap();
        assert_eq!(org.state, OrgState::Active);
    }

    #[tokio::test]
    async fn test_change_removed_org_fails() {
        let service = service();
        let org = service
            .create_org(&ctx(), Org::new("caos", "caos.ch"))
            .await
            .unwrap();
        service.remove_org(&ctx(), &org.aggregate_id).await.unwrap();

        let mut renamed = org.clone();
        renamed.name = "coas".to_string();
        let err = service.change_org(&ctx(), renamed).await.unwrap_err();
        assert!(err.is_invariant_violation());
    }
}
