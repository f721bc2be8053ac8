//! Group registry: membership and grant sets.
//!
//! Sets only grow. Both attach operations hand the union to the store as
//! one update-if-matched call; nothing here reads a group and writes it
//! back.

use warden_core::error::{WardenError, WardenResult};
use warden_core::{EntityId, Group, Resource};
use warden_store::{GroupFilter, SetUnion, SharedStore};

use crate::resources::ResourceRegistry;

/// Owns every [`Group`]. Cheap to clone.
#[derive(Clone)]
pub struct GroupRegistry {
    store: SharedStore,
    resources: ResourceRegistry,
}

impl GroupRegistry {
    /// `resources` is used to resolve grants in [`GroupRegistry::list_grants`].
    pub fn new(store: SharedStore, resources: ResourceRegistry) -> Self {
        Self { store, resources }
    }

    /// Creates a group with no members and no grants.
    pub async fn register(&self, name: &str, description: Option<&str>) -> WardenResult<Group> {
        let group = self.store.insert_group(name, description).await?;
        tracing::info!(id = %group.id, name, "registered group");
        Ok(group)
    }

    pub async fn get_by_id(&self, id: &EntityId) -> WardenResult<Group> {
        self.store
            .find_groups(&GroupFilter::ById(*id))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| WardenError::NotFound(format!("group {id}")))
    }

    pub async fn list_all(&self) -> WardenResult<Vec<Group>> {
        self.store.find_groups(&GroupFilter::All).await
    }

    /// Unions the well-formed candidates into the member set.
    ///
    /// Malformed candidates are dropped. If none are well-formed the call
    /// fails with `InvalidInput` and nothing is written. Returns the number
    /// of members that were new.
    pub async fn attach_members(
        &self,
        group_id: &EntityId,
        candidates: Vec<String>,
    ) -> WardenResult<usize> {
        let total = candidates.len();
        let valid: Vec<String> = candidates
            .into_iter()
            .filter(|c| EntityId::is_well_formed(c))
            .collect();

        if valid.is_empty() {
            return Err(WardenError::InvalidInput(format!(
                "none of the {total} user ids is well-formed"
            )));
        }
        if valid.len() < total {
            tracing::warn!(
                group = %group_id,
                dropped = total - valid.len(),
                "dropping malformed user ids"
            );
        }

        let outcome = self
            .store
            .union_into_group(group_id, SetUnion::Members(valid))
            .await?;
        if !outcome.matched {
            return Err(WardenError::NotFound(format!("group {group_id}")));
        }

        tracing::info!(group = %group_id, added = outcome.added, "attached members");
        Ok(outcome.added)
    }

    /// Unions resource ids into the grant set. Ids are not validated.
    pub async fn attach_grants(
        &self,
        group_id: &EntityId,
        resource_ids: Vec<String>,
    ) -> WardenResult<usize> {
        let outcome = self
            .store
            .union_into_group(group_id, SetUnion::Grants(resource_ids))
            .await?;
        if !outcome.matched {
            return Err(WardenError::NotFound(format!("group {group_id}")));
        }

        tracing::info!(group = %group_id, added = outcome.added, "attached grants");
        Ok(outcome.added)
    }

    pub async fn list_members(&self, group_id: &EntityId) -> WardenResult<Vec<String>> {
        Ok(self.get_by_id(group_id).await?.members.into_vec())
    }

    /// Grants joined against the resource registry. Grant ids that are
    /// malformed or no longer resolve are left out.
    pub async fn list_grants(&self, group_id: &EntityId) -> WardenResult<Vec<Resource>> {
        let group = self.get_by_id(group_id).await?;
        let ids: Vec<EntityId> = group.grants.iter().filter_map(|g| g.parse().ok()).collect();

        let resources = self.resources.get_many(ids).await?;
        if resources.len() < group.grants.len() {
            tracing::debug!(
                group = %group_id,
                grants = group.grants.len(),
                resolved = resources.len(),
                "skipped unresolvable grants"
            );
        }
        Ok(resources)
    }

    /// Whether some group has `user_id` as a member and `resource_id` as a grant.
    pub async fn holds(&self, user_id: &str, resource_id: &EntityId) -> WardenResult<bool> {
        let filter = GroupFilter::MemberWithGrant {
            user_id: user_id.to_string(),
            resource_id: resource_id.to_string(),
        };
        Ok(!self.store.find_groups(&filter).await?.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use warden_store::MemoryStore;

    const U0: &str = "000000000000000000000000";
    const U1: &str = "111111111111111111111111";

    fn registries() -> (ResourceRegistry, GroupRegistry) {
        let store: SharedStore = Arc::new(MemoryStore::new());
        let resources = ResourceRegistry::new(store.clone());
        let groups = GroupRegistry::new(store, resources.clone());
        (resources, groups)
    }

    #[tokio::test]
    async fn register_keeps_optional_description() {
        let (_, groups) = registries();
        let with = groups.register("g1", Some("first")).await.unwrap();
        let without = groups.register("g2", None).await.unwrap();

        assert_eq!(with.description.as_deref(), Some("first"));
        assert_eq!(without.description, None);
        assert!(with.members.is_empty() && with.grants.is_empty());
        assert_eq!(groups.list_all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn attach_members_filters_malformed() {
        let (_, groups) = registries();
        let g = groups.register("g", None).await.unwrap();

        let added = groups
            .attach_members(&g.id, vec!["not-an-id".into(), U0.into()])
            .await
            .unwrap();
        assert_eq!(added, 1);
        assert_eq!(groups.list_members(&g.id).await.unwrap(), vec![U0]);
    }

    #[tokio::test]
    async fn attach_members_all_malformed_is_invalid() {
        let (_, groups) = registries();
        let g = groups.register("g", None).await.unwrap();

        let err = groups
            .attach_members(&g.id, vec!["12345".into(), "*&90)(%$#@)".into()])
            .await
            .unwrap_err();
        assert!(matches!(err, WardenError::InvalidInput(_)));

        let err = groups.attach_members(&g.id, Vec::new()).await.unwrap_err();
        assert!(matches!(err, WardenError::InvalidInput(_)));
        assert!(groups.list_members(&g.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn attach_to_missing_group_is_not_found() {
        let (_, groups) = registries();
        let missing = EntityId::from_bytes([3; 12]);

        let err = groups.attach_members(&missing, vec![U0.into()]).await.unwrap_err();
        assert!(matches!(err, WardenError::NotFound(_)));
        let err = groups.attach_grants(&missing, vec!["x".into()]).await.unwrap_err();
        assert!(matches!(err, WardenError::NotFound(_)));
    }

    #[tokio::test]
    async fn attach_members_is_idempotent() {
        let (_, groups) = registries();
        let g = groups.register("g", None).await.unwrap();

        assert_eq!(groups.attach_members(&g.id, vec![U1.into()]).await.unwrap(), 1);
        assert_eq!(groups.attach_members(&g.id, vec![U1.into()]).await.unwrap(), 0);
        assert_eq!(groups.list_members(&g.id).await.unwrap(), vec![U1]);
    }

    #[tokio::test]
    async fn attach_grants_accepts_any_string() {
        let (_, groups) = registries();
        let g = groups.register("g", None).await.unwrap();

        let added = groups
            .attach_grants(&g.id, vec!["whatever".into(), "whatever".into()])
            .await
            .unwrap();
        assert_eq!(added, 1);
        assert_eq!(groups.get_by_id(&g.id).await.unwrap().grants.len(), 1);
    }

    #[tokio::test]
    async fn list_grants_resolves_and_skips_stale() {
        let (resources, groups) = registries();
        let r = resources.register("rsrc1").await.unwrap();
        let g = groups.register("g", None).await.unwrap();
        groups
            .attach_grants(
                &g.id,
                vec![
                    r.id.to_string(),
                    "garbage".into(),
                    EntityId::from_bytes([5; 12]).to_string(),
                ],
            )
            .await
            .unwrap();

        assert_eq!(groups.list_grants(&g.id).await.unwrap(), vec![r]);
    }

    #[tokio::test]
    async fn listings_on_empty_group_are_empty() {
        let (_, groups) = registries();
        let g = groups.register("g", None).await.unwrap();
        assert!(groups.list_members(&g.id).await.unwrap().is_empty());
        assert!(groups.list_grants(&g.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn listings_on_missing_group_are_not_found() {
        let (_, groups) = registries();
        let missing = EntityId::from_bytes([4; 12]);
        assert!(matches!(
            groups.list_members(&missing).await,
            Err(WardenError::NotFound(_))
        ));
        assert!(matches!(
            groups.list_grants(&missing).await,
            Err(WardenError::NotFound(_))
        ));
    }
}
