use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::identity::{IId, NodeKind};

/// Id carried by the placeholder target of a fresh single link
pub const PLACEHOLDER_ID: &str = "NOACTUALID";

/// Reference container on a node
///
/// A link field points from its owning node at other nodes by identity.
/// The three shapes differ in ordering and duplicate policy; those policies
/// live in [`crate::ops::link_reducer`], the shapes here are plain values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "nodes_ids", rename_all = "snake_case")]
pub enum LinkField {
    /// At most one referenced node
    Single(Option<IId>),
    /// Ordered references
    Array(Vec<IId>),
    /// Unordered references keyed by encoded identity
    Set(IndexMap<String, IId>),
}

impl LinkField {
    /// Zero-value single link
    ///
    /// Points at a placeholder of the first allowed kind, or at nothing when
    /// no kind is given. Allowed kinds are documentation only and are not
    /// enforced at runtime.
    pub fn single(allowed: &[&str]) -> Self {
        LinkField::Single(
            allowed
                .first()
                .map(|kind| IId::new(NodeKind::from(*kind), PLACEHOLDER_ID)),
        )
    }

    /// Zero-value array link
    pub fn array(_allowed: &[&str]) -> Self {
        LinkField::Array(Vec::new())
    }

    /// Zero-value set link
    pub fn set(_allowed: &[&str]) -> Self {
        LinkField::Set(IndexMap::new())
    }

    /// Shape name, used in error reporting
    pub fn shape(&self) -> &'static str {
        match self {
            LinkField::Single(_) => "single",
            LinkField::Array(_) => "array",
            LinkField::Set(_) => "set",
        }
    }

    /// Live references held by this field, in field order
    ///
    /// The placeholder target of a fresh single link is not a live reference.
    pub fn iter(&self) -> Box<dyn Iterator<Item = &IId> + '_> {
        match self {
            LinkField::Single(target) => {
                Box::new(target.iter().filter(|iid| !is_placeholder(iid)))
            }
            LinkField::Array(ids) => Box::new(ids.iter()),
            LinkField::Set(ids) => Box::new(ids.values()),
        }
    }

    /// Whether the field references the given node
    pub fn contains(&self, identity: &IId) -> bool {
        match self {
            LinkField::Single(target) => target.as_ref() == Some(identity),
            LinkField::Array(ids) => ids.contains(identity),
            LinkField::Set(ids) => ids.contains_key(&identity.encode()),
        }
    }

    /// Number of live references
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Whether an identity is the placeholder target of a fresh single link
pub fn is_placeholder(identity: &IId) -> bool {
    identity.id.as_str() == PLACEHOLDER_ID
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_values() {
        assert!(LinkField::array(&["Leaf"]).is_empty());
        assert!(LinkField::set(&["Leaf"]).is_empty());

        let single = LinkField::single(&["Leaf", "Branch"]);
        match &single {
            LinkField::Single(Some(target)) => {
                assert_eq!(target.kind.as_str(), "Leaf");
                assert!(is_placeholder(target));
            }
            other => panic!("unexpected zero value: {:?}", other),
        }
        assert!(single.is_empty());

        assert_eq!(LinkField::single(&[]), LinkField::Single(None));
    }

    #[test]
    fn test_contains_per_shape() {
        let leaf = IId::new("Leaf", "L1");
        let mut set = IndexMap::new();
        set.insert(leaf.encode(), leaf.clone());

        assert!(LinkField::Set(set).contains(&leaf));
        assert!(LinkField::Array(vec![leaf.clone()]).contains(&leaf));
        assert!(LinkField::Single(Some(leaf.clone())).contains(&leaf));
        assert!(!LinkField::Array(Vec::new()).contains(&leaf));
    }

    #[test]
    fn test_shape_names() {
        assert_eq!(LinkField::single(&[]).shape(), "single");
        assert_eq!(LinkField::array(&[]).shape(), "array");
        assert_eq!(LinkField::set(&[]).shape(), "set");
    }
}
