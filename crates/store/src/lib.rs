//! Entity store abstraction and backends for Warden.
//!
//! The store is the only component with state. Registries talk to it
//! through [`EntityStore`]; it is the sole arbiter of consistency.

pub mod document;
pub mod file;
pub mod id;
pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use warden_core::error::{WardenError, WardenResult};
use warden_core::{EntityId, Group, Resource};

pub use file::FileStore;
pub use memory::MemoryStore;

/// Shared handle passed into registries.
pub type SharedStore = Arc<dyn EntityStore>;

/// Selects which resources a read returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceFilter {
    All,
    ById(EntityId),
    ByIds(Vec<EntityId>),
    ByName(String),
}

impl ResourceFilter {
    pub fn matches(&self, resource: &Resource) -> bool {
        match self {
            ResourceFilter::All => true,
            ResourceFilter::ById(id) => resource.id == *id,
            ResourceFilter::ByIds(ids) => ids.contains(&resource.id),
            ResourceFilter::ByName(name) => resource.name == *name,
        }
    }
}

/// Selects which groups a read returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupFilter {
    All,
    ById(EntityId),
    /// Groups that contain `user_id` as a member AND `resource_id` as a grant.
    MemberWithGrant { user_id: String, resource_id: String },
}

impl GroupFilter {
    pub fn matches(&self, group: &Group) -> bool {
        match self {
            GroupFilter::All => true,
            GroupFilter::ById(id) => group.id == *id,
            GroupFilter::MemberWithGrant {
                user_id,
                resource_id,
            } => group.holds(user_id, resource_id),
        }
    }
}

/// A set-union mutation applied to one group document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetUnion {
    Members(Vec<String>),
    Grants(Vec<String>),
}

/// Result of an update-if-matched call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOutcome {
    /// Whether a group with the requested id existed.
    pub matched: bool,
    /// Elements that were not already in the set.
    pub added: usize,
}

/// Storage collaborator contract.
///
/// Implementations must apply [`EntityStore::union_into_group`] as a single
/// atomic document-level operation: concurrent unions on the same group may
/// not lose elements.
#[async_trait]
pub trait EntityStore: Send + Sync {
    async fn insert_resource(&self, name: &str) -> WardenResult<Resource>;
    async fn find_resources(&self, filter: &ResourceFilter) -> WardenResult<Vec<Resource>>;
    async fn insert_group(&self, name: &str, description: Option<&str>) -> WardenResult<Group>;
    async fn find_groups(&self, filter: &GroupFilter) -> WardenResult<Vec<Group>>;
    async fn union_into_group(&self, id: &EntityId, update: SetUnion)
        -> WardenResult<UpdateOutcome>;
}

/// Opens a store from a URL: `memory://` or `file:///path/to/store.json`.
///
/// ```ignore
/// let store = warden_store::open("file:///var/lib/warden/store.json").await?;
/// ```
pub async fn open(store_url: &str) -> WardenResult<SharedStore> {
    if store_url.is_empty() {
        return Err(WardenError::InvalidInput("store URL must not be empty".into()));
    }

    let url = url::Url::parse(store_url)
        .map_err(|e| WardenError::InvalidInput(format!("bad store URL '{store_url}': {e}")))?;

    match url.scheme() {
        "memory" => {
            tracing::info!("using in-memory store");
            Ok(Arc::new(MemoryStore::new()))
        }
        "file" => {
            let path = url.to_file_path().map_err(|()| {
                WardenError::InvalidInput(format!("store URL '{store_url}' has no usable path"))
            })?;
            Ok(Arc::new(FileStore::open(path).await?))
        }
        other => Err(WardenError::InvalidInput(format!(
            "unsupported store scheme '{other}' (expected memory or file)"
        ))),
    }
}
