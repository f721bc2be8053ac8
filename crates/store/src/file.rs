//! JSON-file entity store.
//!
//! Keeps the collections in memory and rewrites the snapshot (temp file +
//! rename) after every mutation, while still holding the lock. A mutation
//! whose write fails is reverted in memory before the error is returned.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::Mutex;
use warden_core::error::{WardenError, WardenResult};
use warden_core::{EntityId, Group, Resource};

use crate::document::Snapshot;
use crate::memory::Collections;
use crate::{EntityStore, GroupFilter, ResourceFilter, SetUnion, UpdateOutcome};

/// Durable single-process store backed by one JSON file.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    state: Mutex<Collections>,
}

impl FileStore {
    /// Loads `path`. A missing file is an empty store; it is created on the
    /// first mutation.
    pub async fn open(path: impl Into<PathBuf>) -> WardenResult<Self> {
        let path = path.into();

        let collections = match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let snapshot: Snapshot = serde_json::from_slice(&bytes).map_err(|e| {
                    WardenError::Storage(format!("corrupt snapshot {}: {e}", path.display()))
                })?;
                Collections::from(snapshot)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Collections::default(),
            Err(e) => {
                return Err(WardenError::Storage(format!(
                    "failed to read {}: {e}",
                    path.display()
                )))
            }
        };

        tracing::info!(
            path = %path.display(),
            resources = collections.resources.len(),
            groups = collections.groups.len(),
            "opened file store"
        );

        Ok(Self {
            path,
            state: Mutex::new(collections),
        })
    }

    async fn persist(&self, collections: &Collections) -> WardenResult<()> {
        let bytes = serde_json::to_vec_pretty(&Snapshot::from(collections))
            .map_err(|e| WardenError::Internal(format!("failed to encode snapshot: {e}")))?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, &bytes)
            .await
            .map_err(|e| WardenError::Storage(format!("failed to write {}: {e}", tmp.display())))?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(|e| {
            WardenError::Storage(format!("failed to replace {}: {e}", self.path.display()))
        })?;

        tracing::trace!(path = %self.path.display(), bytes = bytes.len(), "snapshot written");
        Ok(())
    }
}

#[async_trait]
impl EntityStore for FileStore {
    async fn insert_resource(&self, name: &str) -> WardenResult<Resource> {
        let mut state = self.state.lock().await;
        let resource = state.insert_resource(name);
        if let Err(e) = self.persist(&state).await {
            state.pop_resource();
            return Err(e);
        }
        Ok(resource)
    }

    async fn find_resources(&self, filter: &ResourceFilter) -> WardenResult<Vec<Resource>> {
        Ok(self.state.lock().await.find_resources(filter))
    }

    async fn insert_group(&self, name: &str, description: Option<&str>) -> WardenResult<Group> {
        let mut state = self.state.lock().await;
        let group = state.insert_group(name, description);
        if let Err(e) = self.persist(&state).await {
            state.pop_group();
            return Err(e);
        }
        Ok(group)
    }

    async fn find_groups(&self, filter: &GroupFilter) -> WardenResult<Vec<Group>> {
        Ok(self.state.lock().await.find_groups(filter))
    }

    async fn union_into_group(
        &self,
        id: &EntityId,
        update: SetUnion,
    ) -> WardenResult<UpdateOutcome> {
        let members = matches!(update, SetUnion::Members(_));

        let mut state = self.state.lock().await;
        let outcome = state.union_into_group(id, update);

        // Nothing changed; skip the rewrite.
        if outcome.added == 0 {
            return Ok(outcome);
        }

        if let Err(e) = self.persist(&state).await {
            state.revert_union(id, members, outcome.added);
            return Err(e);
        }
        Ok(outcome)
    }
}
