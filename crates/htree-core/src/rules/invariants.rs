use std::collections::HashSet;

use crate::model::IId;
use crate::tree::TreeView;

/// Check if a node is part of a cycle
///
/// Follows parent back-references upward.
pub fn has_cycle(view: &impl TreeView, identity: &IId) -> bool {
    let mut visited = HashSet::new();
    let mut current = view.get_node(identity);

    while let Some(node) = current {
        if !visited.insert(node.key()) {
            return true;
        }
        current = node
            .parent
            .as_ref()
            .and_then(|parent| view.get_node(&parent.identity));
    }

    false
}

/// Find nodes stored under a key that is not their own encoding
///
/// Returns list of (key, node_key) tuples
pub fn find_key_mismatches(view: &impl TreeView) -> Vec<(String, String)> {
    view.entries()
        .filter(|(key, node)| **key != node.key())
        .map(|(key, node)| (key.clone(), node.key()))
        .collect()
}

/// Find child references that do not resolve to a stored node
///
/// Returns list of (owner_key, field, child_key) tuples
pub fn find_dangling_children(view: &impl TreeView) -> Vec<(String, String, String)> {
    let mut dangling = Vec::new();

    for node in view.iter() {
        for (field, child) in node.child_ids() {
            if view.get_node(child).is_none() {
                dangling.push((node.key(), field.to_string(), child.encode()));
            }
        }
    }

    dangling
}

/// Find broken parent back-references
///
/// A non-root node must name an existing parent whose children field holds
/// it, and every child reference must be answered by the child's own
/// back-reference.
///
/// Returns list of (node_key, reason) tuples
pub fn find_parent_ref_mismatches(view: &impl TreeView) -> Vec<(String, String)> {
    let mut mismatches = Vec::new();
    let root_id = view.root_id();

    for node in view.iter() {
        if &node.identity == root_id {
            continue;
        }
        let parent_ref = match &node.parent {
            Some(p) => p,
            None => {
                mismatches.push((node.key(), "non-root node has no parent".to_string()));
                continue;
            }
        };
        let parent = match view.get_node(&parent_ref.identity) {
            Some(p) => p,
            None => {
                mismatches.push((
                    node.key(),
                    format!("parent {} does not exist", parent_ref.identity),
                ));
                continue;
            }
        };
        let linked = parent
            .child_field(&parent_ref.field)
            .map(|link| link.contains(&node.identity))
            .unwrap_or(false);
        if !linked {
            mismatches.push((
                node.key(),
                format!(
                    "parent {} field '{}' does not reference it",
                    parent_ref.identity, parent_ref.field
                ),
            ));
        }
    }

    for owner in view.iter() {
        for (field, child_id) in owner.child_ids() {
            // Missing children are reported as dangling references
            let Some(child) = view.get_node(child_id) else {
                continue;
            };
            let answers = child
                .parent
                .as_ref()
                .map(|p| p.identity == owner.identity && p.field == field)
                .unwrap_or(false);
            if !answers {
                mismatches.push((
                    child.key(),
                    format!("referenced by {} field '{}' but points elsewhere", owner.key(), field),
                ));
            }
        }
    }

    mismatches
}

/// Find nodes whose parent chain loops
///
/// Returns the keys of nodes on or leading into a cycle
pub fn find_cycles(view: &impl TreeView) -> Vec<String> {
    view.iter()
        .filter(|node| has_cycle(view, &node.identity))
        .map(|node| node.key())
        .collect()
}
