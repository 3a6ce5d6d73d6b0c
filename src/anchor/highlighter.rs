//! Selection-driven anchor creation
//!
//! A [`Highlighter`] inspects whatever selection its [`SelectionSource`]
//! currently holds, builds an anchor from it and hands the anchor to a
//! callback. It is the zero-argument "highlight this" trigger a UI binds to a
//! button or key.

use tracing::{debug, warn};

use super::{Anchor, AnchorBuilder, Selection};
use crate::document::{Document, NodeId};
use crate::error::{DetachedNodeError, DocumentError};
use crate::tree::Tree;

/// Something that holds the user's current selection
pub trait SelectionSource {
    type Tree: Tree;

    /// Tree the selection points into
    fn tree(&self) -> &Self::Tree;

    /// The active selection, if any
    fn current(&self) -> Option<Selection<<Self::Tree as Tree>::Node>>;

    /// Drop the active selection
    fn clear(&mut self);
}

/// Binds a selection source to an anchor callback
pub struct Highlighter<S, F> {
    source: S,
    on_create: F,
}

impl<S, F> Highlighter<S, F>
where
    S: SelectionSource,
    F: FnMut(Anchor),
{
    pub fn new(source: S, on_create: F) -> Self {
        Self { source, on_create }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Turn the current selection into an anchor
    ///
    /// Returns `Ok(true)` when the callback ran. The selection is cleared only
    /// after a successful hand-off.
    pub fn trigger(&mut self) -> Result<bool, DetachedNodeError> {
        let Some(selection) = self.source.current() else {
            return Ok(false);
        };

        let anchor = AnchorBuilder::new(self.source.tree()).build(&selection.range, &selection.text)?;
        match anchor {
            Some(anchor) => {
                debug!(text = %anchor.text, "Created anchor from selection");
                (self.on_create)(anchor);
                self.source.clear();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// Build a zero-argument trigger over `source`
///
/// Detached selections are logged and skipped; they never reach `on_create`.
pub fn create_anchor_builder<S, F>(source: S, on_create: F) -> impl FnMut()
where
    S: SelectionSource,
    F: FnMut(Anchor),
{
    let mut highlighter = Highlighter::new(source, on_create);
    move || {
        if let Err(e) = highlighter.trigger() {
            warn!("Could not anchor selection: {}", e);
        }
    }
}

/// Selection state over a parsed [`Document`]
#[derive(Debug, Clone)]
pub struct DocumentSelection<'a> {
    document: &'a Document,
    active: Option<Selection<NodeId>>,
}

impl<'a> DocumentSelection<'a> {
    pub fn new(document: &'a Document) -> Self {
        Self {
            document,
            active: None,
        }
    }

    /// Select the character span `start..end` of the rendered text
    pub fn select(&mut self, start: usize, end: usize) -> Result<(), DocumentError> {
        self.active = Some(self.document.select_chars(start, end)?);
        Ok(())
    }

    /// Replace the active selection with an explicit one
    pub fn set(&mut self, selection: Selection<NodeId>) {
        self.active = Some(selection);
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_none()
    }
}

impl<'a> SelectionSource for DocumentSelection<'a> {
    type Tree = Document;

    fn tree(&self) -> &Document {
        self.document
    }

    fn current(&self) -> Option<Selection<NodeId>> {
        self.active.clone()
    }

    fn clear(&mut self) {
        self.active = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anchor::{Position, Range};

    fn sample() -> Document {
        Document::parse("<article><p>The quick brown fox</p></article>").unwrap()
    }

    #[test]
    fn test_trigger_creates_anchor_and_clears() {
        let doc = sample();
        let mut created = Vec::new();
        {
            let mut highlighter = Highlighter::new(DocumentSelection::new(&doc), |a| created.push(a));
            highlighter.source_mut().select(4, 9).unwrap();

            assert!(highlighter.trigger().unwrap());
            assert!(highlighter.source().is_empty());
            // nothing selected any more
            assert!(!highlighter.trigger().unwrap());
        }

        assert_eq!(created.len(), 1);
        assert_eq!(created[0].text, "quick");
    }

    #[test]
    fn test_trigger_without_selection() {
        let doc = sample();
        let mut calls = 0;
        let mut highlighter = Highlighter::new(DocumentSelection::new(&doc), |_| calls += 1);
        assert!(!highlighter.trigger().unwrap());
        drop(highlighter);
        assert_eq!(calls, 0);
    }

    #[test]
    fn test_collapsed_selection_keeps_state() {
        let doc = sample();
        let mut calls = 0;
        let mut highlighter = Highlighter::new(DocumentSelection::new(&doc), |_| calls += 1);
        highlighter.source_mut().select(3, 3).unwrap();

        assert!(!highlighter.trigger().unwrap());
        assert!(!highlighter.source().is_empty());
        drop(highlighter);
        assert_eq!(calls, 0);
    }

    #[test]
    fn test_create_anchor_builder_closure() {
        let doc = sample();
        let mut selection = DocumentSelection::new(&doc);
        selection.select(10, 19).unwrap();

        let mut created = Vec::new();
        {
            let mut trigger = create_anchor_builder(selection, |a| created.push(a));
            trigger();
            trigger();
        }

        assert_eq!(created.len(), 1);
        assert_eq!(created[0].text, "brown fox");
    }

    #[test]
    fn test_detached_selection_is_skipped() {
        let mut doc = sample();
        let orphan = doc.create_text("loose text");
        let mut selection = DocumentSelection::new(&doc);
        selection.set(Selection {
            range: Range::new(Position::new(orphan, 0), Position::new(orphan, 5)),
            text: "loose".to_string(),
        });

        let mut created = Vec::new();
        {
            let mut trigger = create_anchor_builder(selection, |a| created.push(a));
            trigger();
        }
        assert!(created.is_empty());
    }
}
