//! Tree operations
//!
//! Link reduction, the copy-on-write map and the mutable overlay built on
//! both.

pub mod lazy_map;
pub mod link_reducer;
pub mod overlay;

pub use lazy_map::LazyMap;
pub use link_reducer::{reduce_children, reduce_link, reduce_node, LinkAction};
pub use overlay::{ChangeSummary, MutableTree};
