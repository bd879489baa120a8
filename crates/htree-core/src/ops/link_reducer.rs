//! Link-field reducer
//!
//! Pure transitions over link fields. Every reducer returns the input
//! unchanged (`Cow::Borrowed`, or the same `Arc` at node level) when the
//! action is a no-op, so callers detect change without comparing contents.

use std::borrow::Cow;
use std::sync::Arc;

use crate::errors::{HTreeError, Result};
use crate::model::link::is_placeholder;
use crate::model::{IId, LinkField, LinkFields, Node};

/// Edit applied to one link field
#[derive(Debug, Clone, PartialEq)]
pub enum LinkAction {
    /// Reference a node; arrays append when `at_index` is None
    Add { node: IId, at_index: Option<isize> },
    /// Drop a reference
    Remove { node: IId },
    /// Reposition a reference within an array
    ///
    /// `to_index` is an insertion point in the array as it is before the
    /// move, in `[0, len]`.
    Move { node: IId, to_index: isize },
}

impl LinkAction {
    pub fn name(&self) -> &'static str {
        match self {
            LinkAction::Add { .. } => "add",
            LinkAction::Remove { .. } => "remove",
            LinkAction::Move { .. } => "move",
        }
    }

    pub fn node(&self) -> &IId {
        match self {
            LinkAction::Add { node, .. }
            | LinkAction::Remove { node }
            | LinkAction::Move { node, .. } => node,
        }
    }
}

/// Compute the next value of a link field
///
/// # Errors
///
/// * `IndexOutOfRange` - Array add/move index outside `[0, len]`
/// * `NodeNotInLinkField` - Array move of a node the array does not hold
/// * `UnsupportedLinkAction` - Move on a single link
pub fn reduce_link<'a>(state: &'a LinkField, action: &LinkAction) -> Result<Cow<'a, LinkField>> {
    match state {
        LinkField::Set(ids) => match action {
            LinkAction::Add { node, .. } => {
                let key = node.encode();
                if ids.contains_key(&key) {
                    return Ok(Cow::Borrowed(state));
                }
                let mut next = ids.clone();
                next.insert(key, node.clone());
                Ok(Cow::Owned(LinkField::Set(next)))
            }
            // Sets carry no position: a move only detaches the reference.
            LinkAction::Remove { node } | LinkAction::Move { node, .. } => {
                let key = node.encode();
                if !ids.contains_key(&key) {
                    return Ok(Cow::Borrowed(state));
                }
                let mut next = ids.clone();
                next.shift_remove(&key);
                Ok(Cow::Owned(LinkField::Set(next)))
            }
        },

        LinkField::Array(ids) => match action {
            LinkAction::Add { node, at_index } => {
                if ids.contains(node) {
                    return Ok(Cow::Borrowed(state));
                }
                let at = checked_index(at_index.unwrap_or(ids.len() as isize), ids.len())?;
                let mut next = ids.clone();
                next.insert(at, node.clone());
                Ok(Cow::Owned(LinkField::Array(next)))
            }
            LinkAction::Move { node, to_index } => {
                let to = checked_index(*to_index, ids.len())?;
                let current = ids.iter().position(|iid| iid == node).ok_or_else(|| {
                    HTreeError::NodeNotInLinkField {
                        node_key: node.encode(),
                    }
                })?;
                if to == current || to == current + 1 {
                    return Ok(Cow::Borrowed(state));
                }
                let mut next = ids.clone();
                let moved = next.remove(current);
                let dest = if to > current { to - 1 } else { to };
                next.insert(dest, moved);
                Ok(Cow::Owned(LinkField::Array(next)))
            }
            LinkAction::Remove { node } => match ids.iter().position(|iid| iid == node) {
                // Absent is already the desired end state
                None => Ok(Cow::Borrowed(state)),
                Some(current) => {
                    let mut next = ids.clone();
                    next.remove(current);
                    Ok(Cow::Owned(LinkField::Array(next)))
                }
            },
        },

        LinkField::Single(target) => match action {
            LinkAction::Add { node, .. } => {
                if target.as_ref() == Some(node) {
                    return Ok(Cow::Borrowed(state));
                }
                Ok(Cow::Owned(LinkField::Single(Some(node.clone()))))
            }
            // Clears whatever the link holds; the named node is not consulted.
            LinkAction::Remove { .. } => match target {
                Some(current) if !is_placeholder(current) => {
                    Ok(Cow::Owned(LinkField::Single(None)))
                }
                _ => Ok(Cow::Borrowed(state)),
            },
            LinkAction::Move { .. } => Err(HTreeError::UnsupportedLinkAction {
                action: action.name(),
                shape: state.shape(),
            }),
        },
    }
}

fn checked_index(index: isize, len: usize) -> Result<usize> {
    if index < 0 || index as usize > len {
        return Err(HTreeError::IndexOutOfRange { index, len });
    }
    Ok(index as usize)
}

/// Apply a link action to one field of a children mapping
///
/// Returns a new mapping with only that field replaced, or the input when
/// the field did not change.
///
/// # Errors
///
/// Returns `LinkFieldNotFound` if `field` is not in the mapping, plus any
/// error of [`reduce_link`].
pub fn reduce_children<'a>(
    owner: &IId,
    children: &'a LinkFields,
    field: &str,
    action: &LinkAction,
) -> Result<Cow<'a, LinkFields>> {
    let link = children
        .get(field)
        .ok_or_else(|| HTreeError::LinkFieldNotFound {
            node_key: owner.encode(),
            field: field.to_string(),
        })?;

    match reduce_link(link, action)? {
        Cow::Borrowed(_) => Ok(Cow::Borrowed(children)),
        Cow::Owned(updated) => {
            let mut next = children.clone();
            next.insert(field.to_string(), updated);
            Ok(Cow::Owned(next))
        }
    }
}

/// Apply a link action to a children field of a node
///
/// Returns the same `Arc` when nothing changed.
///
/// # Errors
///
/// See [`reduce_children`].
pub fn reduce_node(node: &Arc<Node>, field: &str, action: &LinkAction) -> Result<Arc<Node>> {
    match reduce_children(&node.identity, &node.children, field, action)? {
        Cow::Borrowed(_) => Ok(Arc::clone(node)),
        Cow::Owned(children) => {
            tracing::debug!(
                node_key = %node.key(),
                link_field = field,
                action = action.name(),
                "children field updated"
            );
            Ok(Arc::new(Node {
                identity: node.identity.clone(),
                data: node.data.clone(),
                children,
                links: node.links.clone(),
                parent: node.parent.clone(),
            }))
        }
    }
}
