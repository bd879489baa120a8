pub mod identity;
pub mod link;
pub mod node;
pub mod schema;

pub use identity::{decode, encode, same_identity, IId, Id, NodeKind};
pub use link::LinkField;
pub use node::{LinkFields, Node, NodeData, ParentRef};
pub use schema::{Schema, SchemaBuilder, TemplateNode};
