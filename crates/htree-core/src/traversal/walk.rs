use std::collections::HashSet;

use crate::errors::{HTreeError, Result};
use crate::model::IId;
use crate::tree::TreeView;

/// Collect a node and its descendants in depth-first pre-order
///
/// Children are visited field by field in declaration order, and within a
/// field in link order.
///
/// # Errors
/// * `NodeNotFound` - If `identity` is not stored
/// * `DanglingChildReference` - If a child reference does not resolve
/// * `CycleDetected` - If a node is reached twice
pub fn walk_children(view: &impl TreeView, identity: &IId) -> Result<Vec<IId>> {
    if view.get_node(identity).is_none() {
        return Err(HTreeError::NodeNotFound {
            node_key: identity.encode(),
        });
    }

    let mut order = Vec::new();
    let mut visited = HashSet::new();
    let mut stack = vec![identity.clone()];

    while let Some(current) = stack.pop() {
        let key = current.encode();
        if !visited.insert(key.clone()) {
            return Err(HTreeError::CycleDetected { node_key: key });
        }
        let node = view
            .get_node(&current)
            .ok_or_else(|| HTreeError::NodeNotFound {
                node_key: key.clone(),
            })?;

        let mut pending = Vec::new();
        for (field, child) in node.child_ids() {
            if view.get_node(child).is_none() {
                return Err(HTreeError::DanglingChildReference {
                    node_key: key,
                    field: field.to_string(),
                    child_key: child.encode(),
                });
            }
            pending.push(child.clone());
        }
        // Reverse so the first child is popped first
        stack.extend(pending.into_iter().rev());
        order.push(current);
    }

    Ok(order)
}
