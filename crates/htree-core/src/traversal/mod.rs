//! Tree traversal
//!
//! - `ancestry`: upward walk along parent back-references
//! - `walk`: depth-first pre-order over children link fields

pub mod ancestry;
pub mod walk;

pub use ancestry::path_to_root;
pub use walk::walk_children;
