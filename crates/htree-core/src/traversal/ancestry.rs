use std::collections::HashSet;

use crate::errors::{HTreeError, Result};
use crate::model::IId;
use crate::tree::TreeView;

/// Compute the path from a node up to the root
///
/// Follows parent back-references. The result starts with `identity` and
/// ends with the topmost ancestor.
///
/// # Errors
/// * `NodeNotFound` - If `identity` is not stored
/// * `InvalidParentRef` - If a back-reference names a missing node
/// * `CycleDetected` - If the parent chain loops
pub fn path_to_root(view: &impl TreeView, identity: &IId) -> Result<Vec<IId>> {
    let mut node = view
        .get_node(identity)
        .ok_or_else(|| HTreeError::NodeNotFound {
            node_key: identity.encode(),
        })?;

    let mut path = Vec::new();
    let mut visited = HashSet::new();

    loop {
        if !visited.insert(node.key()) {
            return Err(HTreeError::CycleDetected {
                node_key: node.key(),
            });
        }
        path.push(node.identity.clone());

        let Some(parent) = &node.parent else {
            break;
        };
        node = view
            .get_node(&parent.identity)
            .ok_or_else(|| HTreeError::InvalidParentRef {
                node_key: node.key(),
                reason: format!("parent {} does not exist", parent.identity),
            })?;
    }

    Ok(path)
}
