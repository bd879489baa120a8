use crate::errors::{HTreeError, Result};
use crate::tree::TreeView;

use super::invariants;

/// Validate the structure of a tree or overlay
///
/// Checks, in order:
///
/// 1. The root exists and has no parent
/// 2. Every key is the encoding of its node's identity
/// 3. Every child reference resolves
/// 4. Parent back-references and child references agree
/// 5. No parent chain loops
///
/// # Errors
/// Returns the first violation encountered. For exhaustive reporting, call
/// the individual invariant functions directly.
pub fn validate_tree(view: &impl TreeView) -> Result<()> {
    let root = view
        .get_node(view.root_id())
        .ok_or_else(|| HTreeError::NodeNotFound {
            node_key: view.root_id().encode(),
        })?;
    if root.parent.is_some() {
        return Err(HTreeError::RootHasParent {
            node_key: root.key(),
        });
    }

    if let Some((key, node_key)) = invariants::find_key_mismatches(view).into_iter().next() {
        return Err(HTreeError::KeyMismatch { key, node_key });
    }

    if let Some((node_key, field, child_key)) =
        invariants::find_dangling_children(view).into_iter().next()
    {
        return Err(HTreeError::DanglingChildReference {
            node_key,
            field,
            child_key,
        });
    }

    if let Some((node_key, reason)) = invariants::find_parent_ref_mismatches(view)
        .into_iter()
        .next()
    {
        return Err(HTreeError::InvalidParentRef { node_key, reason });
    }

    if let Some(node_key) = invariants::find_cycles(view).into_iter().next() {
        return Err(HTreeError::CycleDetected { node_key });
    }

    tracing::debug!(node_count = view.len() as u64, "tree validated");
    Ok(())
}
