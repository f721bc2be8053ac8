//! In-memory entity store.
//!
//! [`Collections`] holds both collections and implements every operation
//! synchronously; [`MemoryStore`] and [`FileStore`](crate::FileStore) wrap
//! it in an async lock. Holding the write side of the lock for the whole
//! union is what makes the update atomic.

use async_trait::async_trait;
use tokio::sync::RwLock;
use warden_core::error::WardenResult;
use warden_core::{EntityId, Group, Resource};

use crate::{EntityStore, GroupFilter, ResourceFilter, SetUnion, UpdateOutcome};

/// Both collections, in insertion order.
#[derive(Debug, Default, Clone)]
pub struct Collections {
    pub(crate) resources: Vec<Resource>,
    pub(crate) groups: Vec<Group>,
}

impl Collections {
    pub fn insert_resource(&mut self, name: &str) -> Resource {
        let resource = Resource {
            id: crate::id::next_id(),
            name: name.to_string(),
        };
        self.resources.push(resource.clone());
        resource
    }

    pub fn find_resources(&self, filter: &ResourceFilter) -> Vec<Resource> {
        self.resources
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect()
    }

    pub fn insert_group(&mut self, name: &str, description: Option<&str>) -> Group {
        let group = Group::new(
            crate::id::next_id(),
            name,
            description.map(str::to_string),
        );
        self.groups.push(group.clone());
        group
    }

    pub fn find_groups(&self, filter: &GroupFilter) -> Vec<Group> {
        self.groups
            .iter()
            .filter(|g| filter.matches(g))
            .cloned()
            .collect()
    }

    pub fn union_into_group(&mut self, id: &EntityId, update: SetUnion) -> UpdateOutcome {
        let Some(group) = self.groups.iter_mut().find(|g| g.id == *id) else {
            return UpdateOutcome::default();
        };

        let added = match update {
            SetUnion::Members(ids) => group.members.union(ids),
            SetUnion::Grants(ids) => group.grants.union(ids),
        };

        UpdateOutcome {
            matched: true,
            added,
        }
    }

    /// Undoes the most recent `insert_resource`.
    pub(crate) fn pop_resource(&mut self) {
        self.resources.pop();
    }

    /// Undoes the most recent `insert_group`.
    pub(crate) fn pop_group(&mut self) {
        self.groups.pop();
    }

    /// Undoes a union that added `added` elements to the members or grants.
    pub(crate) fn revert_union(&mut self, id: &EntityId, members: bool, added: usize) {
        if let Some(group) = self.groups.iter_mut().find(|g| g.id == *id) {
            if members {
                group.members.truncate_last(added);
            } else {
                group.grants.truncate_last(added);
            }
        }
    }
}

/// Volatile store for tests and single-process deployments.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn insert_resource(&self, name: &str) -> WardenResult<Resource> {
        let resource = self.state.write().await.insert_resource(name);
        tracing::debug!(id = %resource.id, name, "inserted resource");
        Ok(resource)
    }

    async fn find_resources(&self, filter: &ResourceFilter) -> WardenResult<Vec<Resource>> {
        Ok(self.state.read().await.find_resources(filter))
    }

    async fn insert_group(&self, name: &str, description: Option<&str>) -> WardenResult<Group> {
        let group = self.state.write().await.insert_group(name, description);
        tracing::debug!(id = %group.id, name, "inserted group");
        Ok(group)
    }

    async fn find_groups(&self, filter: &GroupFilter) -> WardenResult<Vec<Group>> {
        Ok(self.state.read().await.find_groups(filter))
    }

    async fn union_into_group(
        &self,
        id: &EntityId,
        update: SetUnion,
    ) -> WardenResult<UpdateOutcome> {
        let outcome = self.state.write().await.union_into_group(id, update);
        tracing::debug!(%id, matched = outcome.matched, added = outcome.added, "union");
        Ok(outcome)
    }
}
