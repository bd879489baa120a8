use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::identity::{IId, NodeKind};
use super::link::LinkField;
use super::schema::TemplateNode;

/// Kind-specific data record of a node
pub type NodeData = serde_json::Map<String, serde_json::Value>;

/// Named link fields of a node, in declaration order
pub type LinkFields = IndexMap<String, LinkField>;

/// Back-reference from a node to the parent it was inserted under
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParentRef {
    /// Identity of the parent node
    pub identity: IId,

    /// Children field of the parent holding this node
    pub field: String,

    /// Requested array position at insertion time (array fields only)
    ///
    /// This records provenance; later inserts into the same array do not
    /// update it.
    pub index: Option<usize>,
}

/// Tree node
///
/// Nodes are stored behind `Arc` in trees and overlays and are never
/// mutated once shared. Structural edits produce new nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub identity: IId,

    /// Kind-specific data
    pub data: NodeData,

    /// Hierarchical links to child nodes
    pub children: LinkFields,

    /// Non-hierarchical references to other nodes
    pub links: LinkFields,

    /// Insertion provenance (None for the root)
    pub parent: Option<ParentRef>,
}

impl Node {
    /// Instantiate a template under the given identity
    ///
    /// Data and link containers are copied from the template, so edits to the
    /// node never reach the template.
    pub fn from_template(identity: IId, template: &TemplateNode) -> Self {
        Self {
            identity,
            data: template.data.clone(),
            children: template.children.clone(),
            links: template.links.clone(),
            parent: None,
        }
    }

    /// Storage key of this node
    pub fn key(&self) -> String {
        self.identity.encode()
    }

    pub fn kind(&self) -> &NodeKind {
        &self.identity.kind
    }

    /// Check if this node has no parent back-reference
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Children link field by name
    pub fn child_field(&self, field: &str) -> Option<&LinkField> {
        self.children.get(field)
    }

    /// Identities referenced by all children fields, in field order
    pub fn child_ids(&self) -> impl Iterator<Item = (&str, &IId)> + '_ {
        self.children
            .iter()
            .flat_map(|(field, link)| link.iter().map(move |iid| (field.as_str(), iid)))
    }
}
