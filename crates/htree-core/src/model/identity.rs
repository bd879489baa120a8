use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::{HTreeError, Result};

/// Separator between kind tag and id in an encoded identity
pub const SEPARATOR: char = '.';

/// Tag naming a node kind registered in a schema
///
/// Kind tags must be non-empty and must not contain [`SEPARATOR`]; the schema
/// builder enforces this so that encoded identities decode unambiguously.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeKind(String);

impl NodeKind {
    pub fn new(kind: impl Into<String>) -> Self {
        Self(kind.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check that this tag can be used as an encoding prefix
    ///
    /// # Errors
    ///
    /// Returns `InvalidNodeKind` if the tag is empty or contains the separator.
    pub fn validate(&self) -> Result<()> {
        if self.0.is_empty() {
            return Err(HTreeError::InvalidNodeKind {
                kind: self.0.clone(),
                reason: "kind tag cannot be empty".to_string(),
            });
        }
        if self.0.contains(SEPARATOR) {
            return Err(HTreeError::InvalidNodeKind {
                kind: self.0.clone(),
                reason: format!("kind tag cannot contain '{}'", SEPARATOR),
            });
        }
        Ok(())
    }
}

impl From<&str> for NodeKind {
    fn from(kind: &str) -> Self {
        Self::new(kind)
    }
}

impl From<String> for NodeKind {
    fn from(kind: String) -> Self {
        Self(kind)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Node id, unique within the tree
///
/// Integer ids are normalised to their decimal form, so `Id::from(7)` and
/// `Id::from("7")` are the same id. This keeps id equality in lockstep with
/// encoding equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Id(String);

impl Id {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Id {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for Id {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<i64> for Id {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl From<u64> for Id {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl From<i32> for Id {
    fn from(id: i32) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity of a node: its kind paired with its id
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IId {
    pub kind: NodeKind,
    pub id: Id,
}

impl IId {
    pub fn new(kind: impl Into<NodeKind>, id: impl Into<Id>) -> Self {
        Self {
            kind: kind.into(),
            id: id.into(),
        }
    }

    /// Storage key for this identity
    pub fn encode(&self) -> String {
        encode(self)
    }
}

impl fmt::Display for IId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.kind, SEPARATOR, self.id)
    }
}

/// Encode an identity as `kind.id`
pub fn encode(identity: &IId) -> String {
    identity.to_string()
}

/// Recover an identity from its storage key
///
/// Splits on the first separator, since kind tags never contain it. Returns
/// `None` when the key has no separator or an empty kind.
pub fn decode(key: &str) -> Option<IId> {
    let (kind, id) = key.split_once(SEPARATOR)?;
    if kind.is_empty() {
        return None;
    }
    Some(IId::new(kind, id))
}

/// True iff both kind and id match exactly
pub fn same_identity(a: &IId, b: &IId) -> bool {
    a.kind == b.kind && a.id == b.id
}
