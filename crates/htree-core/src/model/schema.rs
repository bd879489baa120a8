use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::identity::NodeKind;
use super::link::LinkField;
use super::node::{LinkFields, NodeData};
use crate::errors::{HTreeError, Result};

/// Prototype from which every node of a kind is synthesized
///
/// Holds the zero-value data record and the empty shape of every children
/// and links field of the kind.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TemplateNode {
    pub data: NodeData,
    pub children: LinkFields,
    pub links: LinkFields,
}

impl TemplateNode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a data field and its zero value
    pub fn with_data(mut self, field: impl Into<String>, zero: impl Into<serde_json::Value>) -> Self {
        self.data.insert(field.into(), zero.into());
        self
    }

    /// Declare a children link field
    pub fn with_child(mut self, field: impl Into<String>, link: LinkField) -> Self {
        self.children.insert(field.into(), link);
        self
    }

    /// Declare a non-hierarchical link field
    pub fn with_link(mut self, field: impl Into<String>, link: LinkField) -> Self {
        self.links.insert(field.into(), link);
        self
    }
}

/// Registry of node kinds plus the designated root kind
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    node_types: IndexMap<NodeKind, TemplateNode>,
    root_type: NodeKind,
}

impl Schema {
    /// Start building a schema rooted at the given kind
    pub fn builder(root_type: impl Into<NodeKind>) -> SchemaBuilder {
        SchemaBuilder {
            node_types: IndexMap::new(),
            root_type: root_type.into(),
        }
    }

    pub fn root_type(&self) -> &NodeKind {
        &self.root_type
    }

    /// Template for a kind
    ///
    /// # Errors
    ///
    /// Returns `UnknownNodeKind` if the kind is not registered.
    pub fn template(&self, kind: &NodeKind) -> Result<&TemplateNode> {
        self.node_types
            .get(kind)
            .ok_or_else(|| HTreeError::UnknownNodeKind {
                kind: kind.to_string(),
            })
    }

    pub fn contains(&self, kind: &NodeKind) -> bool {
        self.node_types.contains_key(kind)
    }

    /// Registered kinds in declaration order
    pub fn kinds(&self) -> impl Iterator<Item = &NodeKind> {
        self.node_types.keys()
    }
}

/// Builder for [`Schema`]
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    node_types: IndexMap<NodeKind, TemplateNode>,
    root_type: NodeKind,
}

impl SchemaBuilder {
    /// Register a kind; registering the same kind again replaces its template
    pub fn node_type(mut self, kind: impl Into<NodeKind>, template: TemplateNode) -> Self {
        self.node_types.insert(kind.into(), template);
        self
    }

    /// Validate and build
    ///
    /// # Errors
    ///
    /// * `InvalidNodeKind` - If a kind tag is empty or contains the separator
    /// * `UnknownNodeKind` - If the root kind has no registered template
    pub fn build(self) -> Result<Schema> {
        for kind in self.node_types.keys() {
            kind.validate()?;
        }
        if !self.node_types.contains_key(&self.root_type) {
            return Err(HTreeError::UnknownNodeKind {
                kind: self.root_type.to_string(),
            });
        }
        Ok(Schema {
            node_types: self.node_types,
            root_type: self.root_type,
        })
    }
}
