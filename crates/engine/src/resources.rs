//! Resource registry: name-only facts to be protected.

use smallvec::SmallVec;
use warden_core::error::{WardenError, WardenResult};
use warden_core::{EntityId, Resource, ResourceMatches};
use warden_store::{ResourceFilter, SharedStore};

/// Owns every [`Resource`]. Cheap to clone.
#[derive(Clone)]
pub struct ResourceRegistry {
    store: SharedStore,
}

impl ResourceRegistry {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Creates a resource. Names are not checked for uniqueness.
    pub async fn register(&self, name: &str) -> WardenResult<Resource> {
        let resource = self.store.insert_resource(name).await?;
        tracing::info!(id = %resource.id, name, "registered resource");
        Ok(resource)
    }

    pub async fn get_by_id(&self, id: &EntityId) -> WardenResult<Resource> {
        self.store
            .find_resources(&ResourceFilter::ById(*id))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| WardenError::NotFound(format!("resource {id}")))
    }

    /// Every resource named exactly `name`: zero, one, or several.
    pub async fn get_by_name(&self, name: &str) -> WardenResult<ResourceMatches> {
        let found = self
            .store
            .find_resources(&ResourceFilter::ByName(name.to_string()))
            .await?;
        Ok(SmallVec::from_vec(found))
    }

    /// Resolves a batch of ids. Unknown ids are skipped.
    pub async fn get_many(&self, ids: Vec<EntityId>) -> WardenResult<Vec<Resource>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.store.find_resources(&ResourceFilter::ByIds(ids)).await
    }

    pub async fn list_all(&self) -> WardenResult<Vec<Resource>> {
        self.store.find_resources(&ResourceFilter::All).await
    }
}
