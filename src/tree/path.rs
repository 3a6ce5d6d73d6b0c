//! Positional paths
//!
//! A path is the list of sibling indices walked from the root down to a node.
//! Paths are only meaningful for the topology they were captured from.

use tracing::trace;

use super::Tree;
use crate::error::DetachedNodeError;

/// Root-to-node sibling indices; the root itself has the empty path
pub type NodePath = Vec<usize>;

/// Compute the root-to-node path of `node`
///
/// Walks upward, recording the node's index among its parent's children at
/// each step. Fails when the walk ends anywhere other than `tree.root()`.
pub fn compute_path<T: Tree + ?Sized>(
    tree: &T,
    node: T::Node,
) -> Result<NodePath, DetachedNodeError> {
    let root = tree.root();
    let mut path = Vec::new();
    let mut current = node;

    while current != root {
        let parent = tree.parent_of(current).ok_or_else(|| {
            DetachedNodeError::new(format!("{:?} has no parent and is not the root", current))
        })?;
        let index = tree.index_of(current).ok_or_else(|| {
            DetachedNodeError::new(format!(
                "{:?} is not listed among the children of {:?}",
                current, parent
            ))
        })?;
        path.push(index);
        current = parent;
    }

    path.reverse();
    trace!(?node, ?path, "Computed node path");
    Ok(path)
}

/// Replay `path` from the root, descending into children by index
///
/// Exact match only: an index past the end of a child list yields `None`.
pub fn resolve_path<T: Tree + ?Sized>(tree: &T, path: &[usize]) -> Option<T::Node> {
    path.iter()
        .try_fold(tree.root(), |node, &index| tree.child_at(node, index))
}
