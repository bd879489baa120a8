//! Validation and Traversal Tests
//!
//! ## Scenarios Covered
//!
//! 1. Trees built through overlays always validate
//! 2. Path to root and pre-order walk over a built tree
//! 3. Errors for unknown starting nodes

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::new_tree;
use htree_core::model::IId;
use htree_core::rules::validate_tree;
use htree_core::traversal::{path_to_root, walk_children};
use htree_core::{HTreeError, MutableTree, NodeInfo, TreeView};

#[test]
fn test_built_tree_validates() {
    // GIVEN a tree with nodes in every link shape
    let tree = new_tree("v");
    let root = tree.root_id().clone();
    let mut overlay = MutableTree::new(tree.clone());
    let a = overlay.add_node(&root, "items", NodeInfo::new("Leaf")).unwrap();
    overlay.add_node(&root, ("order", 0), NodeInfo::new("Leaf")).unwrap();
    overlay.add_node(&root, "main", NodeInfo::new("Leaf")).unwrap();
    overlay
        .add_node(&a.identity, "items", NodeInfo::new("Leaf"))
        .unwrap();

    // THEN both the baseline and the result validate
    validate_tree(&tree).unwrap();
    validate_tree(&overlay).unwrap();
    validate_tree(&overlay.updated_tree()).unwrap();
}

#[test]
fn test_walk_and_path_agree() {
    // GIVEN a three-level tree
    let tree = new_tree("w");
    let root = tree.root_id().clone();
    let mut overlay = MutableTree::new(tree);
    let a = overlay.add_node(&root, "items", NodeInfo::new("Leaf")).unwrap();
    let b = overlay
        .add_node(&a.identity, "items", NodeInfo::new("Leaf"))
        .unwrap();
    let c = overlay.add_node(&root, "order", NodeInfo::new("Leaf")).unwrap();
    let updated = overlay.updated_tree();

    // WHEN walking from the root
    let walk = walk_children(&updated, &root).unwrap();

    // THEN every node is visited once, parents before children
    assert_eq!(walk.len(), updated.len());
    assert_eq!(
        walk,
        vec![root.clone(), a.identity.clone(), b.identity.clone(), c.identity.clone()]
    );

    // AND every visited node's path ends at the root
    for identity in &walk {
        let path = path_to_root(&updated, identity).unwrap();
        assert_eq!(path.first(), Some(identity));
        assert_eq!(path.last(), Some(&root));
    }
}

#[test]
fn test_traversal_of_unknown_node() {
    let tree = new_tree("x");
    let ghost = IId::new("Leaf", "ghost");

    assert!(matches!(
        walk_children(&tree, &ghost),
        Err(HTreeError::NodeNotFound { .. })
    ));
    assert!(matches!(
        path_to_root(&tree, &ghost),
        Err(HTreeError::NodeNotFound { .. })
    ));
}
