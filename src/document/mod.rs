//! Arena document tree
//!
//! A small rendered-content tree built from XHTML. Nodes live in a single
//! arena and are addressed by [`NodeId`]; handle equality is node identity, so
//! siblings with identical text still resolve to distinct paths.
//!
//! Offsets inside text nodes count Unicode scalar values (`char`s).

mod parser;

pub use parser::parse;

use crate::anchor::{Position, Range, Selection};
use crate::error::DocumentError;
use crate::tree::Tree;

/// Handle to a node in a [`Document`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// What a node holds
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// The document node itself
    Root,
    /// An element with its attributes in source order
    Element {
        name: String,
        attributes: Vec<(String, String)>,
    },
    /// A text run
    Text(String),
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Arena-backed content tree
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<NodeData>,
}

const ROOT: NodeId = NodeId(0);

impl Document {
    /// Create an empty document holding only the root node
    pub fn new() -> Self {
        Self {
            nodes: vec![NodeData {
                kind: NodeKind::Root,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    /// Parse XHTML into a document
    pub fn parse(source: &str) -> Result<Self, DocumentError> {
        parser::parse(source)
    }

    fn alloc(&mut self, kind: NodeKind, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            kind,
            parent,
            children: Vec::new(),
        });
        if let Some(parent) = parent {
            self.nodes[parent.0].children.push(id);
        }
        id
    }

    /// Append an element as the last child of `parent`
    ///
    /// # Panics
    ///
    /// Panics if `parent` does not belong to this document.
    pub fn append_element(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
        attributes: Vec<(String, String)>,
    ) -> NodeId {
        self.alloc(
            NodeKind::Element {
                name: name.into(),
                attributes,
            },
            Some(parent),
        )
    }

    /// Append a text node as the last child of `parent`
    ///
    /// # Panics
    ///
    /// Panics if `parent` does not belong to this document.
    pub fn append_text(&mut self, parent: NodeId, text: impl Into<String>) -> NodeId {
        self.alloc(NodeKind::Text(text.into()), Some(parent))
    }

    /// Create a text node that is not attached anywhere
    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.alloc(NodeKind::Text(text.into()), None)
    }

    /// Unlink `node` (and its subtree) from its parent
    ///
    /// Handles that do not belong to this document are ignored.
    pub fn detach(&mut self, node: NodeId) {
        let Some(parent) = self.nodes.get_mut(node.0).and_then(|data| data.parent.take()) else {
            return;
        };
        if let Some(data) = self.nodes.get_mut(parent.0) {
            data.children.retain(|&child| child != node);
        }
    }

    /// The kind of `node`, or `None` for a handle from another document
    pub fn kind(&self, node: NodeId) -> Option<&NodeKind> {
        self.nodes.get(node.0).map(|data| &data.kind)
    }

    fn char_len(&self, node: NodeId) -> usize {
        match &self.nodes[node.0].kind {
            NodeKind::Text(text) => text.chars().count(),
            _ => 0,
        }
    }

    /// Concatenated text of `node` and its descendants
    ///
    /// Iterative pre-order walk. Unknown handles yield an empty string.
    pub fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            let Some(data) = self.nodes.get(current.0) else {
                continue;
            };
            match &data.kind {
                NodeKind::Text(text) => out.push_str(text),
                _ => stack.extend(data.children.iter().rev()),
            }
        }
        out
    }

    /// Rendered text of the whole document
    pub fn text(&self) -> String {
        self.text_content(ROOT)
    }

    /// Attached text nodes in document order
    pub fn text_nodes(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![ROOT];
        while let Some(node) = stack.pop() {
            if let NodeKind::Text(_) = self.nodes[node.0].kind {
                out.push(node);
            }
            stack.extend(self.nodes[node.0].children.iter().rev());
        }
        out
    }

    /// Map the character span `start..end` of the rendered text to a selection
    ///
    /// The start lands at the beginning of the text node that contains it and
    /// the end at the close of the node where the span finishes, the way a
    /// browser normalises a drag selection. A collapsed span yields identical
    /// endpoints.
    pub fn select_chars(&self, start: usize, end: usize) -> Result<Selection<NodeId>, DocumentError> {
        let text = self.text();
        let len = text.chars().count();
        if start > end || end > len {
            return Err(DocumentError::OutOfBounds { start, end, len });
        }

        let start_pos = self.locate(start, false);
        let end_pos = if start == end {
            start_pos
        } else {
            self.locate(end, true)
        };

        Ok(Selection {
            range: Range::new(start_pos, end_pos),
            text: text.chars().skip(start).take(end - start).collect(),
        })
    }

    /// Find the text position for a global character offset
    ///
    /// `at_end` prefers the end of the preceding node over the start of the
    /// following one when the offset falls on a boundary.
    fn locate(&self, offset: usize, at_end: bool) -> Position<NodeId> {
        let mut consumed = 0;
        let mut last = None;

        for node in self.text_nodes() {
            let len = self.char_len(node);
            if len == 0 {
                continue;
            }
            let fits = if at_end {
                offset <= consumed + len
            } else {
                offset < consumed + len
            };
            if fits {
                return Position::new(node, offset - consumed);
            }
            consumed += len;
            last = Some((node, len));
        }

        match last {
            Some((node, len)) => Position::new(node, len),
            None => Position::new(ROOT, 0),
        }
    }

    /// Global character offset of a position, if it lies inside the text
    fn global_offset(&self, position: &Position<NodeId>) -> Option<usize> {
        let node = position.node;
        let before = self.chars_before(node)?;

        match &self.nodes[node.0].kind {
            NodeKind::Text(_) => {
                (position.offset <= self.char_len(node)).then_some(before + position.offset)
            }
            _ => {
                let children = &self.nodes[node.0].children;
                if position.offset > children.len() {
                    return None;
                }
                let inner: usize = children[..position.offset]
                    .iter()
                    .map(|&child| self.text_content(child).chars().count())
                    .sum();
                Some(before + inner)
            }
        }
    }

    /// Characters of text that precede `target` in document order
    fn chars_before(&self, target: NodeId) -> Option<usize> {
        let mut consumed = 0;
        let mut stack = vec![ROOT];
        while let Some(node) = stack.pop() {
            if node == target {
                return Some(consumed);
            }
            consumed += self.char_len(node);
            stack.extend(self.nodes[node.0].children.iter().rev());
        }
        None
    }

    /// Text currently covered by `range`
    pub fn text_in_range(&self, range: &Range<NodeId>) -> Option<String> {
        let start = self.global_offset(&range.start)?;
        let end = self.global_offset(&range.end)?;
        if start > end {
            return None;
        }
        Some(self.text().chars().skip(start).take(end - start).collect())
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree for Document {
    type Node = NodeId;

    fn root(&self) -> NodeId {
        ROOT
    }

    fn parent_of(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node.0).and_then(|data| data.parent)
    }

    fn children_of(&self, node: NodeId) -> Vec<NodeId> {
        self.nodes
            .get(node.0)
            .map(|data| data.children.clone())
            .unwrap_or_default()
    }

    fn child_at(&self, node: NodeId, index: usize) -> Option<NodeId> {
        self.nodes.get(node.0)?.children.get(index).copied()
    }

    fn index_of(&self, node: NodeId) -> Option<usize> {
        let parent = self.nodes.get(node.0)?.parent?;
        self.nodes
            .get(parent.0)?
            .children
            .iter()
            .position(|&child| child == node)
    }
}
