//! Immutable, identity-addressed tree

use std::sync::Arc;

use indexmap::IndexMap;

use crate::errors::Result;
use crate::id_gen::{IdGenerator, UuidV7Generator};
use crate::model::{IId, Id, Node, NodeKind, Schema};

/// Node storage keyed by encoded identity, in insertion order
pub type NodeMap = IndexMap<String, Arc<Node>>;

/// Iterator over the nodes of a tree
pub type Nodes<'a> = indexmap::map::Values<'a, String, Arc<Node>>;

/// Iterator over `(key, node)` pairs of a tree
pub type Entries<'a> = indexmap::map::Iter<'a, String, Arc<Node>>;

/// Read access shared by immutable trees and mutable overlays
pub trait TreeView {
    fn schema(&self) -> &Arc<Schema>;

    fn root_id(&self) -> &IId;

    fn id_generator(&self) -> &Arc<dyn IdGenerator>;

    /// Look up a node; absence is a normal outcome
    fn get_node(&self, identity: &IId) -> Option<&Arc<Node>>;

    /// All nodes in insertion order of the backing mapping
    fn iter(&self) -> Nodes<'_>;

    /// All `(key, node)` pairs in insertion order
    fn entries(&self) -> Entries<'_>;

    /// Number of stored nodes
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Synthesize a detached node of the given kind from its template
    ///
    /// Uses `id` when supplied, otherwise asks the id generator.
    ///
    /// # Errors
    ///
    /// Returns `UnknownNodeKind` if the kind is not in the schema.
    fn empty_node(&self, kind: &NodeKind, id: Option<Id>) -> Result<Node> {
        let template = self.schema().template(kind)?;
        let id = id.unwrap_or_else(|| self.id_generator().next_id());
        Ok(Node::from_template(IId::new(kind.clone(), id), template))
    }
}

/// Immutable tree
///
/// Cloning is cheap: schema, node mapping and nodes are all shared. No
/// operation mutates a tree after construction, so it can be read from
/// any number of threads.
#[derive(Debug, Clone)]
pub struct Tree {
    schema: Arc<Schema>,
    root_id: IId,
    nodes: Arc<NodeMap>,
    id_gen: Arc<dyn IdGenerator>,
}

impl Tree {
    /// Create a tree holding only a fresh root, with UUID v7 ids
    ///
    /// # Errors
    ///
    /// Returns `UnknownNodeKind` if the schema's root kind has no template.
    pub fn new(schema: impl Into<Arc<Schema>>) -> Result<Self> {
        Self::with_id_generator(schema, Arc::new(UuidV7Generator))
    }

    /// Create a tree holding only a fresh root, with the given id generator
    ///
    /// # Errors
    ///
    /// Returns `UnknownNodeKind` if the schema's root kind has no template.
    pub fn with_id_generator(
        schema: impl Into<Arc<Schema>>,
        id_gen: Arc<dyn IdGenerator>,
    ) -> Result<Self> {
        let schema = schema.into();
        let root_kind = schema.root_type().clone();
        let template = schema.template(&root_kind)?;
        let root = Node::from_template(IId::new(root_kind, id_gen.next_id()), template);
        let root_id = root.identity.clone();

        let mut nodes = NodeMap::new();
        nodes.insert(root.key(), Arc::new(root));

        Ok(Self {
            schema,
            root_id,
            nodes: Arc::new(nodes),
            id_gen,
        })
    }

    /// Snapshot another tree or overlay
    ///
    /// Copies the full node set by reference: the new tree owns a new
    /// mapping whose entries point at the same nodes.
    pub fn from_view(view: &impl TreeView) -> Self {
        let nodes: NodeMap = view
            .entries()
            .map(|(key, node)| (key.clone(), Arc::clone(node)))
            .collect();
        Self {
            schema: Arc::clone(view.schema()),
            root_id: view.root_id().clone(),
            nodes: Arc::new(nodes),
            id_gen: Arc::clone(view.id_generator()),
        }
    }

    /// Wrap an existing mapping without copying it
    pub(crate) fn from_parts(
        schema: Arc<Schema>,
        root_id: IId,
        nodes: Arc<NodeMap>,
        id_gen: Arc<dyn IdGenerator>,
    ) -> Self {
        Self {
            schema,
            root_id,
            nodes,
            id_gen,
        }
    }

    pub(crate) fn node_map(&self) -> &Arc<NodeMap> {
        &self.nodes
    }

    /// True iff both values are the same tree (shared mapping and root)
    pub fn ptr_eq(a: &Tree, b: &Tree) -> bool {
        Arc::ptr_eq(&a.nodes, &b.nodes) && a.root_id == b.root_id
    }

    /// The root node
    pub fn root(&self) -> Option<&Arc<Node>> {
        self.get_node(&self.root_id)
    }
}

impl TreeView for Tree {
    fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    fn root_id(&self) -> &IId {
        &self.root_id
    }

    fn id_generator(&self) -> &Arc<dyn IdGenerator> {
        &self.id_gen
    }

    fn get_node(&self, identity: &IId) -> Option<&Arc<Node>> {
        self.nodes.get(&identity.encode())
    }

    fn iter(&self) -> Nodes<'_> {
        self.nodes.values()
    }

    fn entries(&self) -> Entries<'_> {
        self.nodes.iter()
    }

    fn len(&self) -> usize {
        self.nodes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::HTreeError;
    use crate::id_gen::SequentialIdGenerator;
    use crate::model::{LinkField, TemplateNode};

    fn schema() -> Schema {
        Schema::builder("Root")
            .node_type(
                "Root",
                TemplateNode::new().with_child("items", LinkField::set(&["Leaf"])),
            )
            .node_type(
                "Leaf",
                TemplateNode::new()
                    .with_data("label", "")
                    .with_data("weight", 0),
            )
            .build()
            .unwrap()
    }

    fn tree() -> Tree {
        Tree::with_id_generator(schema(), Arc::new(SequentialIdGenerator::new("t"))).unwrap()
    }

    #[test]
    fn test_new_tree_holds_only_root() {
        let tree = tree();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.root_id().encode(), "Root.t1");

        let root = tree.root().unwrap();
        assert!(root.is_root());
        assert!(root.child_field("items").is_some());
    }

    #[test]
    fn test_get_node_absent_is_none() {
        let tree = tree();
        assert!(tree.get_node(&IId::new("Leaf", "missing")).is_none());
    }

    #[test]
    fn test_empty_node_synthesis_independence() {
        let tree = tree();
        let kind = NodeKind::from("Leaf");
        let mut a = tree.empty_node(&kind, None).unwrap();
        let b = tree.empty_node(&kind, None).unwrap();

        assert_ne!(a.identity, b.identity);
        assert_eq!(a.data, b.data);
        assert_eq!(a.children, b.children);
        assert!(a.parent.is_none());

        a.data.insert("label".to_string(), "edited".into());
        assert_ne!(a.data, b.data);
    }

    #[test]
    fn test_empty_node_explicit_id() {
        let tree = tree();
        let node = tree
            .empty_node(&NodeKind::from("Leaf"), Some(Id::from("L1")))
            .unwrap();
        assert_eq!(node.key(), "Leaf.L1");
    }

    #[test]
    fn test_empty_node_unknown_kind() {
        let tree = tree();
        let result = tree.empty_node(&NodeKind::from("Ghost"), None);
        assert!(matches!(result, Err(HTreeError::UnknownNodeKind { .. })));
    }

    #[test]
    fn test_from_view_shares_nodes() {
        let tree = tree();
        let copy = Tree::from_view(&tree);

        assert!(!Tree::ptr_eq(&tree, &copy));
        assert_eq!(copy.root_id(), tree.root_id());
        assert!(Arc::ptr_eq(copy.root().unwrap(), tree.root().unwrap()));
        assert!(Arc::ptr_eq(copy.schema(), tree.schema()));
    }

    #[test]
    fn test_iteration_is_restartable() {
        let tree = tree();
        assert_eq!(tree.iter().count(), 1);
        assert_eq!(tree.iter().count(), 1);
    }
}
