//! HTree Core - Schema-typed heterogeneous tree
//!
//! This crate provides an in-memory tree of typed nodes with copy-on-write
//! mutation tracking, including:
//! - Identity encoding and schema-driven node synthesis
//! - Single, array and set link fields with a pure reducer
//! - Immutable trees and a mutable overlay with a change log
//! - Batch application of change records
//! - Structural validation and traversal

pub mod apply;
pub mod changes;
pub mod errors;
pub mod id_gen;
pub mod logging_facility;
pub mod model;
pub mod ops;
pub mod rules;
pub mod traversal;
pub mod tree;

// Re-export commonly used types
pub use apply::apply;
pub use changes::{Change, NodeInfo, ParentPosition};
pub use errors::{ExError, ExErrorKind, HTreeError, Result};
pub use id_gen::{IdGenerator, SequentialIdGenerator, UuidV7Generator};
pub use model::{IId, Id, LinkField, Node, NodeKind, Schema, TemplateNode};
pub use ops::{ChangeSummary, LinkAction, MutableTree};
pub use tree::{Tree, TreeView};
