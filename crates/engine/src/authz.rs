//! Authorization decisions.
//!
//! A user may access a resource iff some group has the user as a member
//! and the resource as a grant. There is no deny rule and no precedence,
//! and nothing is cached: every call re-reads the current sets.

use warden_core::error::WardenResult;
use warden_core::Decision;
use warden_store::SharedStore;

use crate::groups::GroupRegistry;
use crate::resources::ResourceRegistry;

/// Stateless query over both registries. Cheap to clone; safe to share
/// across concurrent requests.
#[derive(Clone)]
pub struct AuthorizationEngine {
    resources: ResourceRegistry,
    groups: GroupRegistry,
}

impl AuthorizationEngine {
    pub fn new(resources: ResourceRegistry, groups: GroupRegistry) -> Self {
        Self { resources, groups }
    }

    /// Wires both registries onto one store.
    pub fn from_store(store: SharedStore) -> Self {
        let resources = ResourceRegistry::new(store.clone());
        let groups = GroupRegistry::new(store, resources.clone());
        Self::new(resources, groups)
    }

    pub fn resources(&self) -> &ResourceRegistry {
        &self.resources
    }

    pub fn groups(&self) -> &GroupRegistry {
        &self.groups
    }

    /// Decides whether `user_id` may access the resource called `resource_name`.
    ///
    /// When several resources share the name, access to any one of them is
    /// enough.
    pub async fn is_authorized(&self, user_id: &str, resource_name: &str) -> WardenResult<Decision> {
        let matches = self.resources.get_by_name(resource_name).await?;

        if matches.is_empty() {
            tracing::debug!(user_id, resource_name, "no such resource");
            return Ok(Decision::ResourceNotFound);
        }
        if matches.len() > 1 {
            tracing::warn!(
                resource_name,
                count = matches.len(),
                "resource name is ambiguous, checking every match"
            );
        }

        for resource in &matches {
            if self.groups.holds(user_id, &resource.id).await? {
                tracing::debug!(user_id, resource_name, resource = %resource.id, "authorized");
                return Ok(Decision::Authorized);
            }
        }

        tracing::debug!(user_id, resource_name, "denied");
        Ok(Decision::Denied)
    }
}
