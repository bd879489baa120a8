//! Mutable overlay
//!
//! A `MutableTree` stages structural edits on top of an immutable baseline
//! [`Tree`]. The node mapping is shared with the baseline until the first
//! write and only the mapping is copied then; untouched nodes stay
//! `Arc::ptr_eq` with the baseline's.
//!
//! ## Atomicity Contract
//!
//! A failed `add_node` leaves the node map and change log untouched. A failed
//! `apply_changes` restores the overlay to its state before the batch.

use std::sync::Arc;
use std::time::Instant;

use crate::changes::{Change, NodeInfo, ParentPosition};
use crate::errors::{HTreeError, Result};
use crate::id_gen::IdGenerator;
use crate::model::link::PLACEHOLDER_ID;
use crate::model::{IId, LinkField, Node, ParentRef, Schema};
use crate::ops::lazy_map::LazyMap;
use crate::ops::link_reducer::{reduce_node, LinkAction};
use crate::tree::{Entries, Nodes, Tree, TreeView};
use crate::{log_op_end, log_op_error, log_op_start};

/// Keys touched by an overlay, relative to its baseline
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSummary {
    pub added: Vec<String>,
    pub changed: Vec<String>,
    pub deleted: Vec<String>,
}

impl ChangeSummary {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.changed.is_empty() && self.deleted.is_empty()
    }
}

/// Copy-on-write editing session over a tree
#[derive(Debug, Clone)]
pub struct MutableTree {
    original: Tree,
    nodes: LazyMap<String, Arc<Node>>,
    changes: Vec<Change>,
}

impl MutableTree {
    pub fn new(original: Tree) -> Self {
        let nodes = LazyMap::with_equality(Arc::clone(original.node_map()), Arc::ptr_eq);
        Self {
            original,
            nodes,
            changes: Vec::new(),
        }
    }

    /// The baseline this overlay was opened on
    pub fn original_tree(&self) -> &Tree {
        &self.original
    }

    /// Change log, in application order
    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    pub fn has_changed(&self) -> bool {
        !self.changes.is_empty()
    }

    pub fn summary(&self) -> ChangeSummary {
        ChangeSummary {
            added: self.nodes.added().iter().cloned().collect(),
            changed: self.nodes.changed().iter().cloned().collect(),
            deleted: self.nodes.deleted().iter().cloned().collect(),
        }
    }

    /// Materialize the overlay as a tree
    ///
    /// Returns the baseline itself when nothing was recorded. Otherwise the
    /// new tree wraps the overlay's current mapping without copying it.
    pub fn updated_tree(&self) -> Tree {
        if self.changes.is_empty() {
            return self.original.clone();
        }
        Tree::from_parts(
            Arc::clone(self.original.schema()),
            self.original.root_id().clone(),
            self.nodes.snapshot(),
            Arc::clone(self.original.id_generator()),
        )
    }

    /// Create a node and link it into a children field of `parent`
    ///
    /// The child is synthesized from its kind's template, `info.data`
    /// overrides are applied, and its parent back-reference is stamped.
    /// Re-adding an explicit id that the same field already holds returns the
    /// existing node and records nothing.
    ///
    /// Adding into an occupied single link replaces its target. The displaced
    /// child stays stored with its old back-reference; `validate_tree`
    /// reports it as an invalid parent reference.
    ///
    /// # Errors
    ///
    /// * `ParentNotFound` - `parent` is not in the overlay
    /// * `LinkFieldNotFound` - the parent has no such children field
    /// * `UnknownNodeKind` - `info.kind` is not in the schema
    /// * `UnknownDataField` - an override names a field the template lacks
    /// * `NodeAlreadyExists` - the explicit id is already used elsewhere
    /// * `ReservedId` - the explicit id is the single-link placeholder id
    /// * `IndexOutOfRange` - array position outside `[0, len]`
    ///
    /// # Example
    ///
    /// ```
    /// use htree_core::model::{LinkField, Schema, TemplateNode};
    /// use htree_core::{MutableTree, NodeInfo, Tree, TreeView};
    ///
    /// let schema = Schema::builder("Root")
    ///     .node_type("Root", TemplateNode::new().with_child("items", LinkField::set(&["Leaf"])))
    ///     .node_type("Leaf", TemplateNode::new().with_data("weight", 0))
    ///     .build()
    ///     .unwrap();
    /// let tree = Tree::new(schema).unwrap();
    /// let root = tree.root_id().clone();
    ///
    /// let mut overlay = MutableTree::new(tree);
    /// let leaf = overlay
    ///     .add_node(&root, "items", NodeInfo::new("Leaf").with("weight", 3))
    ///     .unwrap();
    /// assert_eq!(leaf.data["weight"], 3);
    /// assert_eq!(overlay.updated_tree().len(), 2);
    /// ```
    pub fn add_node(
        &mut self,
        parent: &IId,
        position: impl Into<ParentPosition>,
        info: NodeInfo,
    ) -> Result<Arc<Node>> {
        let position = position.into();
        log_op_start!(
            "add_node",
            parent_key = %parent,
            link_field = position.field.as_str(),
            node_kind = info.kind.as_str()
        );
        let start = Instant::now();

        let node = self.add_node_inner(parent, &position, info).map_err(|e| {
            log_op_error!(
                "add_node",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            e
        })?;

        log_op_end!(
            "add_node",
            duration_ms = start.elapsed().as_millis() as u64,
            node_key = %node.identity
        );

        Ok(node)
    }

    fn add_node_inner(
        &mut self,
        parent: &IId,
        position: &ParentPosition,
        info: NodeInfo,
    ) -> Result<Arc<Node>> {
        let parent_key = parent.encode();
        let parent_node = self
            .nodes
            .get(&parent_key)
            .cloned()
            .ok_or_else(|| HTreeError::ParentNotFound {
                parent_key: parent_key.clone(),
            })?;
        let link = parent_node
            .child_field(&position.field)
            .ok_or_else(|| HTreeError::LinkFieldNotFound {
                node_key: parent_key.clone(),
                field: position.field.clone(),
            })?;

        if let Some(id) = &info.id {
            let identity = IId::new(info.kind.clone(), id.clone());
            let key = identity.encode();
            if id.as_str() == PLACEHOLDER_ID {
                return Err(HTreeError::ReservedId { node_key: key });
            }
            if let Some(existing) = self.nodes.get(&key) {
                if link.contains(&identity) {
                    tracing::debug!(node_key = %key, "node already linked, nothing to do");
                    return Ok(Arc::clone(existing));
                }
                return Err(HTreeError::NodeAlreadyExists { node_key: key });
            }
        }

        let mut child = self.empty_node(&info.kind, info.id.clone())?;
        for (field, value) in &info.data {
            match child.data.get_mut(field) {
                Some(slot) => *slot = value.clone(),
                None => {
                    return Err(HTreeError::UnknownDataField {
                        kind: info.kind.to_string(),
                        field: field.clone(),
                    })
                }
            }
        }

        let updated_parent = reduce_node(
            &parent_node,
            &position.field,
            &LinkAction::Add {
                node: child.identity.clone(),
                at_index: position.index,
            },
        )?;

        let index = match link {
            LinkField::Array(_) => position.index.and_then(|i| usize::try_from(i).ok()),
            _ => None,
        };
        child.parent = Some(ParentRef {
            identity: parent_node.identity.clone(),
            field: position.field.clone(),
            index,
        });
        let child = Arc::new(child);
        let child_key = child.key();

        self.nodes.insert(parent_key, updated_parent);
        self.nodes.insert(child_key, Arc::clone(&child));
        self.changes.push(Change::AddNodeToTree {
            parent: parent_node.identity.clone(),
            position: position.clone(),
            node_info: NodeInfo {
                kind: info.kind,
                id: Some(child.identity.id.clone()),
                data: info.data,
            },
        });

        Ok(child)
    }

    /// Apply a batch of changes in order
    ///
    /// Each change sees the state produced by the ones before it. The batch
    /// is all-or-nothing.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedChange` for change kinds other than
    /// `AddNodeToTree`, plus any error of [`add_node`](Self::add_node).
    pub fn apply_changes(&mut self, changes: impl IntoIterator<Item = Change>) -> Result<()> {
        log_op_start!("apply_changes");
        let start = Instant::now();

        self.nodes.begin_batch();
        let checkpoint_len = self.changes.len();

        let mut applied: u64 = 0;
        for change in changes {
            if let Err(e) = self.apply_change(change) {
                self.nodes.rollback_batch();
                self.changes.truncate(checkpoint_len);
                log_op_error!(
                    "apply_changes",
                    e.clone(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    change_count = applied
                );
                return Err(e);
            }
            applied += 1;
        }
        self.nodes.commit_batch();

        log_op_end!(
            "apply_changes",
            duration_ms = start.elapsed().as_millis() as u64,
            change_count = applied
        );
        Ok(())
    }

    /// Apply a single change
    ///
    /// # Errors
    ///
    /// Same as [`apply_changes`](Self::apply_changes). A failed change leaves
    /// the overlay untouched.
    pub fn apply_change(&mut self, change: Change) -> Result<()> {
        match change {
            Change::AddNodeToTree {
                parent,
                position,
                node_info,
            } => self
                .add_node_inner(&parent, &position, node_info)
                .map(|_| ()),
            other => Err(HTreeError::UnsupportedChange {
                change: other.name(),
            }),
        }
    }

    /// Replay this overlay's change log on another baseline
    ///
    /// Recorded changes carry resolved ids, so replayed nodes keep the
    /// identities they have here.
    ///
    /// # Errors
    ///
    /// Returns the first error raised while replaying.
    pub fn rebase(&self, baseline: Tree) -> Result<MutableTree> {
        log_op_start!(
            "rebase",
            change_count = self.changes.len() as u64,
            node_count = baseline.len() as u64
        );
        let start = Instant::now();

        let mut rebased = MutableTree::new(baseline);
        rebased
            .apply_changes(self.changes.iter().cloned())
            .map_err(|e| {
                log_op_error!(
                    "rebase",
                    e.clone(),
                    duration_ms = start.elapsed().as_millis() as u64
                );
                e
            })?;

        log_op_end!("rebase", duration_ms = start.elapsed().as_millis() as u64);
        Ok(rebased)
    }
}

impl TreeView for MutableTree {
    fn schema(&self) -> &Arc<Schema> {
        self.original.schema()
    }

    fn root_id(&self) -> &IId {
        self.original.root_id()
    }

    fn id_generator(&self) -> &Arc<dyn IdGenerator> {
        self.original.id_generator()
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
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::id_gen::SequentialIdGenerator;
    use crate::model::TemplateNode;

    fn tree() -> Tree {
        let schema = Schema::builder("Root")
            .node_type(
                "Root",
                TemplateNode::new()
                    .with_child("items", LinkField::set(&["Leaf"]))
                    .with_child("order", LinkField::array(&["Leaf"]))
                    .with_child("main", LinkField::single(&["Leaf"])),
            )
            .node_type("Leaf", TemplateNode::new().with_data("weight", 0))
            .build()
            .unwrap();
        Tree::with_id_generator(schema, Arc::new(SequentialIdGenerator::new("n"))).unwrap()
    }

    #[test]
    fn test_fresh_overlay_reads_baseline() {
        let base = tree();
        let overlay = MutableTree::new(base.clone());

        assert_eq!(overlay.len(), 1);
        assert!(overlay.get_node(base.root_id()).is_some());
        assert!(!overlay.has_changed());
        assert!(overlay.summary().is_empty());
        assert!(Tree::ptr_eq(&overlay.updated_tree(), &base));
    }

    #[test]
    fn test_add_node_stamps_parent() {
        let base = tree();
        let root = base.root_id().clone();
        let mut overlay = MutableTree::new(base);

        let leaf = overlay
            .add_node(&root, ("order", 0), NodeInfo::new("Leaf"))
            .unwrap();
        let parent = leaf.parent.as_ref().unwrap();
        assert_eq!(parent.identity, root);
        assert_eq!(parent.field, "order");
        assert_eq!(parent.index, Some(0));

        let set_leaf = overlay.add_node(&root, "items", NodeInfo::new("Leaf")).unwrap();
        assert_eq!(set_leaf.parent.as_ref().unwrap().index, None);
    }

    #[test]
    fn test_add_node_records_resolved_id() {
        let base = tree();
        let root = base.root_id().clone();
        let mut overlay = MutableTree::new(base);
        let leaf = overlay.add_node(&root, "items", NodeInfo::new("Leaf")).unwrap();

        match &overlay.changes()[0] {
            Change::AddNodeToTree { node_info, .. } => {
                assert_eq!(node_info.id.as_ref(), Some(&leaf.identity.id));
            }
            other => panic!("unexpected change {:?}", other),
        }
    }

    #[test]
    fn test_unknown_data_field_rejected() {
        let base = tree();
        let root = base.root_id().clone();
        let mut overlay = MutableTree::new(base);

        let result = overlay.add_node(&root, "items", NodeInfo::new("Leaf").with("colour", "red"));
        assert!(matches!(result, Err(HTreeError::UnknownDataField { .. })));
        assert_eq!(overlay.len(), 1);
        assert!(overlay.changes().is_empty());
    }

    #[test]
    fn test_unknown_link_field_rejected() {
        let base = tree();
        let root = base.root_id().clone();
        let mut overlay = MutableTree::new(base);

        let result = overlay.add_node(&root, "nope", NodeInfo::new("Leaf"));
        assert!(matches!(result, Err(HTreeError::LinkFieldNotFound { .. })));
    }

    #[test]
    fn test_explicit_id_conflict() {
        let base = tree();
        let root = base.root_id().clone();
        let mut overlay = MutableTree::new(base);
        overlay
            .add_node(&root, "items", NodeInfo::new("Leaf").with_id("L1"))
            .unwrap();

        let result = overlay.add_node(&root, "order", NodeInfo::new("Leaf").with_id("L1"));
        assert!(matches!(result, Err(HTreeError::NodeAlreadyExists { .. })));
        assert_eq!(overlay.changes().len(), 1);
    }

    #[test]
    fn test_single_link_fill_then_replace() {
        let base = tree();
        let root = base.root_id().clone();
        let mut overlay = MutableTree::new(base);

        let first = overlay.add_node(&root, "main", NodeInfo::new("Leaf")).unwrap();
        let parent = overlay.get_node(&root).unwrap();
        assert_eq!(
            parent.child_field("main"),
            Some(&LinkField::Single(Some(first.identity.clone())))
        );

        let second = overlay.add_node(&root, "main", NodeInfo::new("Leaf")).unwrap();
        let parent = overlay.get_node(&root).unwrap();
        assert_eq!(
            parent.child_field("main"),
            Some(&LinkField::Single(Some(second.identity.clone())))
        );

        // The displaced child is still stored
        assert!(overlay.get_node(&first.identity).is_some());
        assert_eq!(overlay.len(), 3);
        assert_eq!(overlay.changes().len(), 2);
    }

    #[test]
    fn test_placeholder_id_rejected() {
        let base = tree();
        let root = base.root_id().clone();
        let mut overlay = MutableTree::new(base);

        let result = overlay.add_node(
            &root,
            "main",
            NodeInfo::new("Leaf").with_id(PLACEHOLDER_ID),
        );

        assert!(matches!(
            result,
            Err(HTreeError::ReservedId { ref node_key }) if node_key == "Leaf.NOACTUALID"
        ));
        assert_eq!(overlay.len(), 1);
        assert!(overlay.changes().is_empty());
    }

    #[test]
    fn test_summary_tracks_added_and_changed() {
        let base = tree();
        let root = base.root_id().clone();
        let mut overlay = MutableTree::new(base);
        let leaf = overlay.add_node(&root, "items", NodeInfo::new("Leaf")).unwrap();

        let summary = overlay.summary();
        assert_eq!(summary.added, vec![leaf.key()]);
        assert_eq!(summary.changed, vec![root.encode()]);
        assert!(summary.deleted.is_empty());
    }

    #[test]
    fn test_apply_changes_rejects_unsupported_atomically() {
        let base = tree();
        let root = base.root_id().clone();
        let mut overlay = MutableTree::new(base);

        let result = overlay.apply_changes(vec![
            Change::AddNodeToTree {
                parent: root.clone(),
                position: ParentPosition::field("items"),
                node_info: NodeInfo::new("Leaf"),
            },
            Change::DeleteTreeNode { node: root },
        ]);

        assert!(matches!(
            result,
            Err(HTreeError::UnsupportedChange {
                change: "DeleteTreeNode"
            })
        ));
        assert_eq!(overlay.len(), 1);
        assert!(overlay.changes().is_empty());
        assert!(overlay.summary().is_empty());
    }

    #[test]
    fn test_batches_reuse_owned_mapping() {
        let base = tree();
        let root = base.root_id().clone();
        let mut overlay = MutableTree::new(base);
        let kept = overlay.add_node(&root, "items", NodeInfo::new("Leaf")).unwrap();
        let owned = Arc::as_ptr(&overlay.nodes.snapshot());

        overlay
            .apply_changes(vec![Change::AddNodeToTree {
                parent: root.clone(),
                position: ParentPosition::field("order"),
                node_info: NodeInfo::new("Leaf"),
            }])
            .unwrap();
        assert_eq!(Arc::as_ptr(&overlay.nodes.snapshot()), owned);
        assert_eq!(overlay.len(), 3);

        let result = overlay.apply_changes(vec![
            Change::AddNodeToTree {
                parent: root.clone(),
                position: ParentPosition::field("main"),
                node_info: NodeInfo::new("Leaf"),
            },
            Change::DeleteTreeNode { node: root.clone() },
        ]);
        assert!(result.is_err());
        assert_eq!(Arc::as_ptr(&overlay.nodes.snapshot()), owned);
        assert_eq!(overlay.len(), 3);
        assert_eq!(overlay.changes().len(), 2);
        assert_eq!(
            overlay.get_node(&root).unwrap().child_field("main"),
            Some(&LinkField::single(&["Leaf"]))
        );
        assert!(overlay.get_node(&kept.identity).is_some());
    }

    #[test]
    fn test_apply_single_change() {
        let base = tree();
        let root = base.root_id().clone();
        let mut overlay = MutableTree::new(base);

        overlay
            .apply_change(Change::AddNodeToTree {
                parent: root,
                position: ParentPosition::at("order", 0),
                node_info: NodeInfo::new("Leaf").with_id("L1"),
            })
            .unwrap();

        assert!(overlay.get_node(&IId::new("Leaf", "L1")).is_some());
        assert_eq!(overlay.changes().len(), 1);
    }
}
