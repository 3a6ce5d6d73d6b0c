//! Anchors
//!
//! An [`Anchor`] is the durable form of a selection: the trimmed selected text
//! plus the positional path and offset of both endpoints. It carries no live
//! references into the tree it was captured from, so it can be serialized and
//! stored.
//!
//! The persisted shape is
//! `{id, text, startPath, startOffset, endPath, endOffset}`.

mod builder;
mod highlighter;

pub use builder::AnchorBuilder;
pub use highlighter::{create_anchor_builder, DocumentSelection, Highlighter, SelectionSource};

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::tree::{resolve_path, NodePath, Tree};

/// A point inside a tree: a node and an offset into its content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position<N> {
    pub node: N,
    pub offset: usize,
}

impl<N> Position<N> {
    pub fn new(node: N, offset: usize) -> Self {
        Self { node, offset }
    }
}

/// An ordered pair of positions; callers keep `start` before `end`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range<N> {
    pub start: Position<N>,
    pub end: Position<N>,
}

impl<N: PartialEq> Range<N> {
    pub fn new(start: Position<N>, end: Position<N>) -> Self {
        Self { start, end }
    }

    /// Both endpoints are the same position
    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }
}

/// A live selection: the range plus the text it renders as
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection<N> {
    pub range: Range<N>,
    pub text: String,
}

/// Serializable description of a selected span
///
/// `id` is empty until the anchor is promoted to an annotation by a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Anchor {
    pub id: String,
    pub text: String,
    pub start_path: NodePath,
    pub start_offset: usize,
    pub end_path: NodePath,
    pub end_offset: usize,
}

impl Anchor {
    /// Anchor whose endpoints share a node path
    pub fn within(text: impl Into<String>, path: NodePath, start: usize, end: usize) -> Self {
        Self {
            id: String::new(),
            text: text.into(),
            start_path: path.clone(),
            start_offset: start,
            end_path: path,
            end_offset: end,
        }
    }

    /// Whether a store has assigned this anchor an id yet
    pub fn is_identified(&self) -> bool {
        !self.id.is_empty()
    }

    /// Replay both paths against `tree`
    ///
    /// Exact-path resolution: returns `None` when either path no longer
    /// exists. Offsets are not checked against node content.
    pub fn resolve<T: Tree + ?Sized>(&self, tree: &T) -> Option<Range<T::Node>> {
        let start = resolve_path(tree, &self.start_path)?;
        let end = resolve_path(tree, &self.end_path)?;
        Some(Range::new(
            Position::new(start, self.start_offset),
            Position::new(end, self.end_offset),
        ))
    }
}

/// Order anchors by where they start, then where they end, in document order
///
/// Paths compare lexicographically, so an ancestor sorts before its
/// descendants, which matches pre-order traversal.
pub fn compare_anchors(a: &Anchor, b: &Anchor) -> Ordering {
    (&a.start_path, a.start_offset, &a.end_path, a.end_offset).cmp(&(
        &b.start_path,
        b.start_offset,
        &b.end_path,
        b.end_offset,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;

    #[test]
    fn test_serialized_field_names() {
        let anchor = Anchor::within("hello", vec![0, 1], 0, 5);
        let json = serde_json::to_value(&anchor).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "id": "",
                "text": "hello",
                "startPath": [0, 1],
                "startOffset": 0,
                "endPath": [0, 1],
                "endOffset": 5
            })
        );
    }

    #[test]
    fn test_resolve_against_tree() {
        let doc = Document::parse("<body><p>alpha</p><p>beta</p></body>").unwrap();
        let anchor = Anchor::within("beta", vec![0, 1, 0], 0, 4);

        let range = anchor.resolve(&doc).unwrap();
        assert_eq!(doc.text_in_range(&range).unwrap(), "beta");
    }

    #[test]
    fn test_resolve_missing_path() {
        let doc = Document::parse("<body><p>alpha</p></body>").unwrap();
        let anchor = Anchor::within("gone", vec![0, 4, 0], 0, 4);
        assert!(anchor.resolve(&doc).is_none());
    }

    #[test]
    fn test_compare_anchors_document_order() {
        let mut anchors = vec![
            Anchor::within("c", vec![0, 2], 0, 1),
            Anchor::within("b", vec![0, 1, 0], 3, 4),
            Anchor::within("a", vec![0, 1], 0, 1),
            Anchor::within("b0", vec![0, 1, 0], 1, 2),
        ];
        anchors.sort_by(compare_anchors);

        let texts: Vec<_> = anchors.iter().map(|a| a.text.as_str()).collect();
        assert_eq!(texts, vec!["a", "b0", "b", "c"]);
    }

    #[test]
    fn test_collapsed_range() {
        let p = Position::new(3usize, 2);
        assert!(Range::new(p, p).is_collapsed());
        assert!(!Range::new(p, Position::new(3usize, 4)).is_collapsed());
    }
}
