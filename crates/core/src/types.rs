//! Domain types for the Warden access-control service.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use smallvec::SmallVec;
use std::fmt;
use std::str::FromStr;

use crate::error::WardenError;

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Store-native opaque identifier: 12 bytes, rendered as 24 hex chars.
///
/// Layout when generated: `timestamp(4) | process(5) | counter(3)`, all
/// big-endian, so ids sort roughly by creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId([u8; 12]);

impl EntityId {
    pub const LEN: usize = 12;
    pub const HEX_LEN: usize = Self::LEN * 2;

    pub const fn from_bytes(bytes: [u8; 12]) -> Self {
        Self(bytes)
    }

    pub fn from_parts(timestamp: u32, process: [u8; 5], counter: u32) -> Self {
        let mut bytes = [0u8; 12];
        bytes[..4].copy_from_slice(&timestamp.to_be_bytes());
        bytes[4..9].copy_from_slice(&process);
        bytes[9..].copy_from_slice(&counter.to_be_bytes()[1..]);
        Self(bytes)
    }

    pub fn bytes(&self) -> &[u8; 12] {
        &self.0
    }

    /// Seconds since the Unix epoch embedded at generation time.
    pub fn timestamp(&self) -> u32 {
        u32::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]])
    }

    /// Whether `s` is a well-formed identifier (24 hex chars, any case).
    ///
    /// Used to reject garbage user ids before they reach a member set.
    pub fn is_well_formed(s: &str) -> bool {
        s.len() == Self::HEX_LEN && s.bytes().all(|b| b.is_ascii_hexdigit())
    }
}

impl FromStr for EntityId {
    type Err = WardenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != Self::HEX_LEN {
            return Err(WardenError::InvalidInput(format!(
                "malformed id '{s}': expected {} hex characters",
                Self::HEX_LEN
            )));
        }
        let mut bytes = [0u8; 12];
        hex::decode_to_slice(s, &mut bytes)
            .map_err(|e| WardenError::InvalidInput(format!("malformed id '{s}': {e}")))?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl Serialize for EntityId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Id sets
// ---------------------------------------------------------------------------

/// Insertion-ordered set of identifier strings.
///
/// Every mutation goes through [`IdSet::union`], so duplicates can never
/// appear regardless of what callers pass in.
///
/// Backed by a `Vec` so listings come back in attach order; membership
/// checks are linear.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdSet(Vec<String>);

impl IdSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds every item not already present. Returns how many were new.
    pub fn union<I>(&mut self, items: I) -> usize
    where
        I: IntoIterator<Item = String>,
    {
        let before = self.0.len();
        for item in items {
            if !self.contains(&item) {
                self.0.push(item);
            }
        }
        self.0.len() - before
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.iter().any(|x| x == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Drops the last `n` inserted ids. Only used to undo a union whose
    /// persistence failed.
    pub fn truncate_last(&mut self, n: usize) {
        let keep = self.0.len().saturating_sub(n);
        self.0.truncate(keep);
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl FromIterator<String> for IdSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut set = IdSet::new();
        set.union(iter);
        set
    }
}

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

/// A named, protectable entity. Names are not unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    #[serde(rename = "_id")]
    pub id: EntityId,
    pub name: String,
}

/// All resources sharing a name. Almost always exactly one.
pub type ResourceMatches = SmallVec<[Resource; 1]>;

/// A named collection of members (user ids) and grants (resource ids).
///
/// `grants` holds raw strings: they are not validated on attach and may go
/// stale if a resource disappears.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub id: EntityId,
    pub name: String,
    pub description: Option<String>,
    pub members: IdSet,
    pub grants: IdSet,
}

impl Group {
    pub fn new(id: EntityId, name: impl Into<String>, description: Option<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description,
            members: IdSet::new(),
            grants: IdSet::new(),
        }
    }

    /// True when `user_id` is a member and `resource_id` is granted.
    pub fn holds(&self, user_id: &str, resource_id: &str) -> bool {
        self.members.contains(user_id) && self.grants.contains(resource_id)
    }
}

// ---------------------------------------------------------------------------
// Decision
// ---------------------------------------------------------------------------

/// Outcome of an authorization query.
///
/// `ResourceNotFound` is kept apart from `Denied`; collapsing the two is a
/// boundary-layer choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Authorized,
    Denied,
    ResourceNotFound,
}

impl Decision {
    pub fn is_authorized(&self) -> bool {
        matches!(self, Decision::Authorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ZEROS: &str = "000000000000000000000000";

    #[test]
    fn entity_id_parse_and_display() {
        let id: EntityId = "65A1B2C3D4E5F60718293A4B".parse().unwrap();
        assert_eq!(id.to_string(), "65a1b2c3d4e5f60718293a4b");
        assert_eq!(id.timestamp(), 0x65a1_b2c3);
    }

    #[test]
    fn entity_id_rejects_garbage() {
        assert!("12345".parse::<EntityId>().is_err());
        assert!("*&90)(%$#@)".parse::<EntityId>().is_err());
        assert!("zz0000000000000000000000".parse::<EntityId>().is_err());
        assert!("0000000000000000000000000".parse::<EntityId>().is_err());
    }

    #[test]
    fn well_formed_matches_parse() {
        for s in [ZEROS, "111111111111111111111111", "abcdefABCDEF012345678901"] {
            assert!(EntityId::is_well_formed(s));
            assert!(s.parse::<EntityId>().is_ok());
        }
        for s in ["", "not-an-id", "00000000000000000000000g", "ü0000000000000000000000"] {
            assert!(!EntityId::is_well_formed(s));
        }
    }

    #[test]
    fn from_parts_layout() {
        let id = EntityId::from_parts(1, [2, 3, 4, 5, 6], 0x0a0b0c);
        assert_eq!(id.to_string(), "0000000102030405060a0b0c");
        assert_eq!(id.bytes()[9..], [0x0a, 0x0b, 0x0c]);
    }

    #[test]
    fn entity_id_serializes_as_string() {
        let id: EntityId = ZEROS.parse().unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{ZEROS}\""));
        let back: EntityId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn union_is_idempotent() {
        let mut set = IdSet::new();
        assert_eq!(set.union(vec!["a".to_string()]), 1);
        assert_eq!(set.union(vec!["a".to_string()]), 0);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn union_dedups_within_one_call() {
        let mut set = IdSet::new();
        let added = set.union(["b", "a", "b", "a"].map(String::from));
        assert_eq!(added, 2);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["b", "a"]);
    }

    #[test]
    fn truncate_last_undoes_union() {
        let mut set: IdSet = ["a", "b"].map(String::from).into_iter().collect();
        let added = set.union(["b", "c", "d"].map(String::from));
        set.truncate_last(added);
        assert_eq!(set.into_vec(), vec!["a", "b"]);
    }

    #[test]
    fn id_set_collect_dedups() {
        let set: IdSet = ["x", "y", "x"].map(String::from).into_iter().collect();
        assert_eq!(set.len(), 2);
        assert!(set.contains("y"));
    }

    #[test]
    fn resource_uses_underscore_id() {
        let r = Resource {
            id: ZEROS.parse().unwrap(),
            name: "rsrc1".into(),
        };
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v["_id"], ZEROS);
        assert_eq!(v["name"], "rsrc1");
    }

    #[test]
    fn group_holds_requires_both() {
        let mut g = Group::new(ZEROS.parse().unwrap(), "g", None);
        g.members.union(vec!["u1".to_string()]);
        assert!(!g.holds("u1", "r1"));
        g.grants.union(vec!["r1".to_string()]);
        assert!(g.holds("u1", "r1"));
        assert!(!g.holds("u2", "r1"));
    }

    #[test]
    fn decision_serializes_snake_case() {
        let v = serde_json::to_value(Decision::ResourceNotFound).unwrap();
        assert_eq!(v, "resource_not_found");
    }

    #[test]
    fn decision_flags() {
        assert!(Decision::Authorized.is_authorized());
        assert!(!Decision::Denied.is_authorized());
        assert!(!Decision::ResourceNotFound.is_authorized());
    }
}
