//! Functional-boundary apply function
//!
//! `apply()` is the one-call entry point for batch edits: it opens an
//! overlay on a tree, applies the changes and returns the updated tree.
//!
//! ## Atomicity Contract
//!
//! - **All-or-nothing**: either every change applies and a new tree is
//!   returned, or an error is returned and no tree is produced
//! - **Input untouched**: the input tree is shared, never mutated
//!
//! ## Example
//!
//! ```
//! use htree_core::model::{LinkField, Schema, TemplateNode};
//! use htree_core::{apply, Change, NodeInfo, ParentPosition, Tree, TreeView};
//!
//! let schema = Schema::builder("Root")
//!     .node_type("Root", TemplateNode::new().with_child("items", LinkField::array(&["Leaf"])))
//!     .node_type("Leaf", TemplateNode::new())
//!     .build()
//!     .unwrap();
//! let tree = Tree::new(schema).unwrap();
//!
//! let change = Change::AddNodeToTree {
//!     parent: tree.root_id().clone(),
//!     position: ParentPosition::at("items", 0),
//!     node_info: NodeInfo::new("Leaf").with_id("L1"),
//! };
//! let updated = apply(&tree, vec![change]).unwrap();
//! assert_eq!(updated.len(), 2);
//! assert_eq!(tree.len(), 1);
//! ```

use std::time::Instant;

use crate::changes::Change;
use crate::errors::Result;
use crate::ops::MutableTree;
use crate::tree::{Tree, TreeView};
use crate::{log_op_end, log_op_error, log_op_start};

/// Apply a batch of changes to a tree, returning the updated tree
///
/// An empty batch returns a tree pointer-equal to the input.
///
/// # Errors
///
/// Returns the first error raised by a change. See `HTreeError` for the
/// full taxonomy.
pub fn apply(tree: &Tree, changes: impl IntoIterator<Item = Change>) -> Result<Tree> {
    log_op_start!("apply", node_count = tree.len() as u64);
    let start = Instant::now();

    let mut overlay = MutableTree::new(tree.clone());
    overlay.apply_changes(changes).map_err(|e| {
        log_op_error!(
            "apply",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64
        );
        e
    })?;
    let updated = overlay.updated_tree();

    log_op_end!(
        "apply",
        duration_ms = start.elapsed().as_millis() as u64,
        change_count = overlay.changes().len() as u64,
        node_count = updated.len() as u64
    );
    Ok(updated)
}
