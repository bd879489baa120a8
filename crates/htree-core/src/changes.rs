//! Change records
//!
//! A `Change` describes one structural edit to a tree. Overlays append one
//! per effective operation, and a change log can be replayed through
//! [`MutableTree::apply_changes`](crate::ops::MutableTree::apply_changes).

use serde::{Deserialize, Serialize};

use crate::model::{IId, Id, NodeData, NodeKind};

/// Where a node goes inside its parent
///
/// `index` only matters for array fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentPosition {
    pub field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<isize>,
}

impl ParentPosition {
    pub fn field(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            index: None,
        }
    }

    pub fn at(field: impl Into<String>, index: isize) -> Self {
        Self {
            field: field.into(),
            index: Some(index),
        }
    }
}

impl From<&str> for ParentPosition {
    fn from(field: &str) -> Self {
        Self::field(field)
    }
}

impl From<String> for ParentPosition {
    fn from(field: String) -> Self {
        Self::field(field)
    }
}

impl From<(&str, isize)> for ParentPosition {
    fn from((field, index): (&str, isize)) -> Self {
        Self::at(field, index)
    }
}

/// Description of a node to create
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeInfo {
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Id>,
    /// Overrides for the kind's template data
    #[serde(default)]
    pub data: NodeData,
}

impl NodeInfo {
    pub fn new(kind: impl Into<NodeKind>) -> Self {
        Self {
            kind: kind.into(),
            id: None,
            data: NodeData::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<Id>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Override one data field
    pub fn with(mut self, field: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.data.insert(field.into(), value.into());
        self
    }
}

/// Structural edit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Change {
    /// Create a node and link it under `parent`
    AddNodeToTree {
        parent: IId,
        position: ParentPosition,
        node_info: NodeInfo,
    },

    /// Relocate an existing node (declared, not yet supported)
    MoveTreeNode {
        node: IId,
        parent: IId,
        position: ParentPosition,
    },

    /// Remove a node (declared, not yet supported)
    DeleteTreeNode { node: IId },

    /// Edit node data (declared, not yet supported)
    ChangeTreeNodeInfo { node: IId, data_changes: NodeData },
}

impl Change {
    pub fn name(&self) -> &'static str {
        match self {
            Change::AddNodeToTree { .. } => "AddNodeToTree",
            Change::MoveTreeNode { .. } => "MoveTreeNode",
            Change::DeleteTreeNode { .. } => "DeleteTreeNode",
            Change::ChangeTreeNodeInfo { .. } => "ChangeTreeNodeInfo",
        }
    }
}
