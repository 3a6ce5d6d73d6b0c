//! Tree capability
//!
//! Path computation only needs three questions answered about a tree: who is
//! a node's parent, what are a node's children, and which node is the root.
//! Any rendered tree (the arena [`Document`](crate::document::Document), a
//! browser DOM binding, a widget tree) can implement [`Tree`] and reuse the
//! path algorithms in [`path`].

pub mod path;

pub use path::{compute_path, resolve_path, NodePath};

/// Read-only structural view of a rendered tree
///
/// `Node` is a handle. Handle equality must be identity: two distinct nodes
/// with identical content compare unequal.
pub trait Tree {
    type Node: Copy + Eq + std::fmt::Debug;

    /// The node every attached path starts from
    fn root(&self) -> Self::Node;

    /// Parent of `node`, or `None` for the root and for detached nodes
    fn parent_of(&self, node: Self::Node) -> Option<Self::Node>;

    /// Immediate children of `node`, in order
    ///
    /// Returned by value so live bindings can collect children from whatever
    /// structure they wrap.
    fn children_of(&self, node: Self::Node) -> Vec<Self::Node>;

    /// Child of `node` at `index`
    fn child_at(&self, node: Self::Node, index: usize) -> Option<Self::Node> {
        self.children_of(node).get(index).copied()
    }

    /// Index of `node` among its parent's immediate children
    fn index_of(&self, node: Self::Node) -> Option<usize> {
        let parent = self.parent_of(node)?;
        self.children_of(parent).iter().position(|&child| child == node)
    }
}

impl<T: Tree + ?Sized> Tree for &T {
    type Node = T::Node;

    fn root(&self) -> Self::Node {
        (**self).root()
    }

    fn parent_of(&self, node: Self::Node) -> Option<Self::Node> {
        (**self).parent_of(node)
    }

    fn children_of(&self, node: Self::Node) -> Vec<Self::Node> {
        (**self).children_of(node)
    }

    fn child_at(&self, node: Self::Node, index: usize) -> Option<Self::Node> {
        (**self).child_at(node, index)
    }

    fn index_of(&self, node: Self::Node) -> Option<usize> {
        (**self).index_of(node)
    }
}
