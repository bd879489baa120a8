use std::sync::Arc;

use htree_core::model::{LinkField, Schema, TemplateNode};
use htree_core::{SequentialIdGenerator, Tree};

/// Schema used across the integration suites
///
/// `Root` holds a set (`items`), an array (`order`) and a single link
/// (`main`). `Leaf` carries a `label` and a `weight` and can nest leaves
/// under its own `items` set.
#[allow(dead_code)]
pub fn test_schema() -> Schema {
    Schema::builder("Root")
        .node_type(
            "Root",
            TemplateNode::new()
                .with_data("title", "")
                .with_child("items", LinkField::set(&["Leaf"]))
                .with_child("order", LinkField::array(&["Leaf"]))
                .with_child("main", LinkField::single(&["Leaf"])),
        )
        .node_type(
            "Leaf",
            TemplateNode::new()
                .with_data("label", "")
                .with_data("weight", 0)
                .with_child("items", LinkField::set(&["Leaf"]))
                .with_link("peer", LinkField::single(&["Leaf"])),
        )
        .build()
        .unwrap()
}

/// Create a tree with deterministic ids (`<prefix>1`, `<prefix>2`, ...)
#[allow(dead_code)]
pub fn new_tree(prefix: &str) -> Tree {
    Tree::with_id_generator(test_schema(), Arc::new(SequentialIdGenerator::new(prefix))).unwrap()
}
