//! Persisted document layout.
//!
//! Groups embed their sets as `userIds: [{userId}]` and
//! `resourceIds: [{resourceId}]`. Resources are stored as-is.

use serde::{Deserialize, Serialize};
use warden_core::{EntityId, Group, Resource};

use crate::memory::Collections;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdEntry {
    #[serde(rename = "userId")]
    pub user_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceIdEntry {
    #[serde(rename = "resourceId")]
    pub resource_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupDocument {
    #[serde(rename = "_id")]
    pub id: EntityId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "userIds", default)]
    pub user_ids: Vec<UserIdEntry>,
    #[serde(rename = "resourceIds", default)]
    pub resource_ids: Vec<ResourceIdEntry>,
}

impl From<&Group> for GroupDocument {
    fn from(group: &Group) -> Self {
        Self {
            id: group.id,
            name: group.name.clone(),
            description: group.description.clone(),
            user_ids: group
                .members
                .iter()
                .map(|u| UserIdEntry {
                    user_id: u.to_string(),
                })
                .collect(),
            resource_ids: group
                .grants
                .iter()
                .map(|r| ResourceIdEntry {
                    resource_id: r.to_string(),
                })
                .collect(),
        }
    }
}

impl From<GroupDocument> for Group {
    fn from(doc: GroupDocument) -> Self {
        let mut group = Group::new(doc.id, doc.name, doc.description);
        group
            .members
            .union(doc.user_ids.into_iter().map(|e| e.user_id));
        group
            .grants
            .union(doc.resource_ids.into_iter().map(|e| e.resource_id));
        group
    }
}

/// Whole-store snapshot: `{"resources": [...], "groups": [...]}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub resources: Vec<Resource>,
    #[serde(default)]
    pub groups: Vec<GroupDocument>,
}

impl From<&Collections> for Snapshot {
    fn from(c: &Collections) -> Self {
        Self {
            resources: c.resources.clone(),
            groups: c.groups.iter().map(GroupDocument::from).collect(),
        }
    }
}

impl From<Snapshot> for Collections {
    fn from(s: Snapshot) -> Self {
        Collections {
            resources: s.resources,
            groups: s.groups.into_iter().map(Group::from).collect(),
        }
    }
}
