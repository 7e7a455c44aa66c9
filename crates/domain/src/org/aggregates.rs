//! Org command handlers: pure functions turning an intended change into the
//! aggregates that realize it.

use event_store::{
    Aggregate, AggregateId, Event, EventQuery, IdentityContext, PreconditionError, Sequence,
};

use super::changes::OrgChanges;
use super::events::{
    ORG_AGGREGATE_TYPE, ORG_DOMAIN_UNIQUE, ORG_NAME_UNIQUE, OrgEvent, ReservationData,
    UniqueField,
};
use super::{Org, OrgState};
use crate::aggregate::{AggregateCreator, AggregateExt, DeferredAggregate};
use crate::error::{DomainError, PartialBatch};

/// Validation for a reservation aggregate.
///
/// Only the newest matched event counts: a `reserved` event means the value
/// is held. Otherwise the value is free and the newest sequence (or the
/// initial sequence when nothing matched) becomes the anchor.
pub fn is_reserved_validation(
    reserved: &'static str,
) -> impl Fn(&[Event]) -> Result<Option<Sequence>, PreconditionError> + Send + Sync + 'static {
    move |events: &[Event]| match events.last() {
        None => Ok(Some(Sequence::initial())),
        Some(latest) if latest.event_type == reserved => Err(PreconditionError::new(format!(
            "{} is already reserved",
            latest.aggregate_id
        ))),
        Some(latest) => Ok(Some(latest.sequence)),
    }
}

fn unique_aggregate(
    ctx: &IdentityContext,
    creator: &AggregateCreator,
    field: &UniqueField,
    org_id: &AggregateId,
    value: &str,
) -> Result<Aggregate, DomainError> {
    if value.is_empty() {
        return Err(DomainError::InvariantViolation(format!(
            "{} must not be empty",
            field.label
        )));
    }
    let id = AggregateId::new(value);
    let query = EventQuery::for_aggregate(field.aggregate_type, id.clone())
        .event_types([field.reserved, field.released]);

    let aggregate = creator
        .new_aggregate(ctx, &id, field.aggregate_type, Some(Sequence::initial()))?
        .push_data(
            field.reserved,
            &ReservationData {
                org_id: org_id.clone(),
            },
        )?
        .set_precondition(query, is_reserved_validation(field.reserved));
    Ok(aggregate)
}

/// Claims `name` for the org `org_id`.
pub fn unique_name_aggregate(
    ctx: &IdentityContext,
    creator: &AggregateCreator,
    org_id: &AggregateId,
    name: &str,
) -> Result<Aggregate, DomainError> {
    unique_aggregate(ctx, creator, &ORG_NAME_UNIQUE, org_id, name)
}

/// Claims `domain` for the org `org_id`.
pub fn unique_domain_aggregate(
    ctx: &IdentityContext,
    creator: &AggregateCreator,
    org_id: &AggregateId,
    domain: &str,
) -> Result<Aggregate, DomainError> {
    unique_aggregate(ctx, creator, &ORG_DOMAIN_UNIQUE, org_id, domain)
}

// Releases carry no anchor: a value held by this org can only be claimed
// again after the release is committed.
fn release_unique_aggregate(
    ctx: &IdentityContext,
    creator: &AggregateCreator,
    field: &UniqueField,
    org_id: &AggregateId,
    value: &str,
) -> Result<Aggregate, DomainError> {
    let aggregate = creator
        .new_aggregate(ctx, &AggregateId::new(value), field.aggregate_type, None)?
        .push_data(
            field.released,
            &ReservationData {
                org_id: org_id.clone(),
            },
        )?;
    Ok(aggregate)
}

/// Builds the aggregates creating `org`: the org itself, then the domain
/// reservation, then the name reservation.
///
/// Construction continues past a failed reservation so the returned
/// [`PartialBatch`] lists everything that could be built.
pub fn org_created_aggregates(
    ctx: &IdentityContext,
    creator: &AggregateCreator,
    org: Option<&Org>,
) -> Result<Vec<Aggregate>, PartialBatch> {
    let Some(org) = org else {
        return Err(PartialBatch::empty(DomainError::InvariantViolation(
            "org is required".to_string(),
        )));
    };

    let mut aggregates = Vec::with_capacity(3);
    let mut first_error = None;

    let steps = [
        creator
            .new_aggregate(
                ctx,
                &org.aggregate_id,
                ORG_AGGREGATE_TYPE,
                Some(Sequence::initial()),
            )
            .and_then(|a| a.push(&OrgEvent::added(&org.name, &org.domain))),
        unique_domain_aggregate(ctx, creator, &org.aggregate_id, &org.domain),
        unique_name_aggregate(ctx, creator, &org.aggregate_id, &org.name),
    ];
    for step in steps {
        match step {
            Ok(aggregate) => aggregates.push(aggregate),
            Err(e) => {
                first_error.get_or_insert(e);
            }
        }
    }

    match first_error {
        Some(source) => Err(PartialBatch { aggregates, source }),
        None => Ok(aggregates),
    }
}

fn diff<'a>(
    existing: Option<&'a Org>,
    updated: Option<&'a Org>,
) -> Result<(&'a Org, OrgChanges), DomainError> {
    let (Some(existing), Some(updated)) = (existing, updated) else {
        return Err(DomainError::InvariantViolation(
            "existing and updated org are required".to_string(),
        ));
    };
    let changes = OrgChanges::between(existing, updated);
    if changes.is_empty() {
        return Err(DomainError::InvariantViolation(
            "org has not been changed".to_string(),
        ));
    }
    Ok((existing, changes))
}

/// Builds the aggregates changing `existing` into `updated`.
///
/// Every changed field contributes a pair: the change event on the org,
/// anchored at the org's sequence, and a claim on the new value.
pub fn org_update_aggregates(
    ctx: &IdentityContext,
    creator: &AggregateCreator,
    existing: Option<&Org>,
    updated: Option<&Org>,
) -> Result<Vec<Aggregate>, DomainError> {
    let (existing, changes) = diff(existing, updated)?;

    let mut aggregates = Vec::with_capacity(changes.len() * 2);
    for change in changes.iter() {
        let org = creator
            .new_aggregate(
                ctx,
                &existing.aggregate_id,
                ORG_AGGREGATE_TYPE,
                Some(existing.sequence),
            )?
            .push(&change.field.changed_event(&change.new))?;
        aggregates.push(org);
        aggregates.push(unique_aggregate(
            ctx,
            creator,
            change.field.unique(),
            &existing.aggregate_id,
            &change.new,
        )?);
    }
    Ok(aggregates)
}

/// Builds the releases of the values `existing` gives up by becoming
/// `updated`. Pushed in the same batch as [`org_update_aggregates`].
pub fn released_unique_aggregates(
    ctx: &IdentityContext,
    creator: &AggregateCreator,
    existing: Option<&Org>,
    updated: Option<&Org>,
) -> Result<Vec<Aggregate>, DomainError> {
    let (existing, changes) = diff(existing, updated)?;

    changes
        .iter()
        .filter(|change| !change.old.is_empty())
        .map(|change| {
            release_unique_aggregate(
                ctx,
                creator,
                change.field.unique(),
                &existing.aggregate_id,
                &change.old,
            )
        })
        .collect()
}

fn transition(
    creator: &AggregateCreator,
    org: Option<&Org>,
    from: OrgState,
    event: OrgEvent,
) -> Result<DeferredAggregate, DomainError> {
    let Some(org) = org else {
        return Err(DomainError::InvariantViolation("org is required".to_string()));
    };
    if org.state.is_removed() {
        return Err(DomainError::InvariantViolation(format!(
            "org {} is removed",
            org.aggregate_id
        )));
    }
    if org.state != from {
        return Err(DomainError::LogicalContradiction(format!(
            "org {} is already {}",
            org.aggregate_id, org.state
        )));
    }
    DeferredAggregate::new(
        creator,
        org.aggregate_id.clone(),
        ORG_AGGREGATE_TYPE,
        Some(org.sequence),
    )
    .push(&event)
}

/// Checks that `org` can be reactivated. The returned descriptor is
/// realized with the caller's identity.
pub fn org_reactivate_aggregate(
    creator: &AggregateCreator,
    org: Option<&Org>,
) -> Result<DeferredAggregate, DomainError> {
    transition(creator, org, OrgState::Inactive, OrgEvent::Reactivated)
}

/// Checks that `org` can be deactivated. The returned descriptor is
/// realized with the caller's identity.
pub fn org_deactivate_aggregate(
    creator: &AggregateCreator,
    org: Option<&Org>,
) -> Result<DeferredAggregate, DomainError> {
    transition(creator, org, OrgState::Active, OrgEvent::Deactivated)
}

/// Builds the aggregates removing `org` and releasing its name and domain.
pub fn org_remove_aggregates(
    ctx: &IdentityContext,
    creator: &AggregateCreator,
    org: Option<&Org>,
) -> Result<Vec<Aggregate>, DomainError> {
    let Some(org) = org else {
        return Err(DomainError::InvariantViolation("org is required".to_string()));
    };
    if org.state.is_removed() {
        return Err(DomainError::LogicalContradiction(format!(
            "org {} is already removed",
            org.aggregate_id
        )));
    }

    let mut aggregates = vec![
        creator
            .new_aggregate(ctx, &org.aggregate_id, ORG_AGGREGATE_TYPE, Some(org.sequence))?
            .push(&OrgEvent::Removed)?,
    ];
    for (field, value) in [(&ORG_NAME_UNIQUE, &org.name), (&ORG_DOMAIN_UNIQUE, &org.domain)] {
        if !value.is_empty() {
            aggregates.push(release_unique_aggregate(
                ctx,
                creator,
                field,
                &org.aggregate_id,
                value,
            )?);
        }
    }
    Ok(aggregates)
}
