//! Identity context stamped onto events.

use serde::{Deserialize, Serialize};

/// Who is acting, and on behalf of which tenant.
///
/// Populated by the authentication layer in front of the core; the core only
/// reads it when stamping events.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IdentityContext {
    resource_owner: String,
    editor_user: String,
}

impl IdentityContext {
    /// Creates a context for `editor_user` acting within `resource_owner`.
    pub fn new(resource_owner: impl Into<String>, editor_user: impl Into<String>) -> Self {
        Self {
            resource_owner: resource_owner.into(),
            editor_user: editor_user.into(),
        }
    }

    /// The tenant (organisation) the request is scoped to.
    pub fn resource_owner(&self) -> &str {
        &self.resource_owner
    }

    /// The user causing the change.
    pub fn editor_user(&self) -> &str {
        &self.editor_user
    }
}
