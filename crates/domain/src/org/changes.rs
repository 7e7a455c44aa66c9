//! Field-by-field diff between two org snapshots.

use super::events::{ORG_DOMAIN_UNIQUE, ORG_NAME_UNIQUE, OrgEvent, UniqueField};
use super::Org;

/// An org field that can be changed after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrgField {
    Name,
    Domain,
}

impl OrgField {
    /// The reservation that keeps this field globally unique.
    pub fn unique(&self) -> &'static UniqueField {
        match self {
            OrgField::Name => &ORG_NAME_UNIQUE,
            OrgField::Domain => &ORG_DOMAIN_UNIQUE,
        }
    }

    /// The org event recording a new value for this field.
    pub fn changed_event(&self, value: &str) -> OrgEvent {
        match self {
            OrgField::Name => OrgEvent::name_changed(value),
            OrgField::Domain => OrgEvent::domain_changed(value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldChange {
    pub field: OrgField,
    pub old: String,
    pub new: String,
}

/// Every field that differs between two snapshots, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrgChanges(Vec<FieldChange>);

impl OrgChanges {
    pub fn between(existing: &Org, updated: &Org) -> Self {
        let fields = [
            (OrgField::Name, &existing.name, &updated.name),
            (OrgField::Domain, &existing.domain, &updated.domain),
        ];
        Self(
            fields
                .into_iter()
                .filter(|(_, old, new)| old != new)
                .map(|(field, old, new)| FieldChange {
                    field,
                    old: old.clone(),
                    new: new.clone(),
                })
                .collect(),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldChange> {
        self.0.iter()
    }
}
