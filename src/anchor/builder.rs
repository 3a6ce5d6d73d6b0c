//! Anchor construction from a live range

use tracing::debug;

use super::{Anchor, Range};
use crate::error::DetachedNodeError;
use crate::tree::{compute_path, Tree};

/// Turns ranges over a tree into [`Anchor`]s
pub struct AnchorBuilder<'a, T: Tree + ?Sized> {
    tree: &'a T,
}

impl<'a, T: Tree + ?Sized> AnchorBuilder<'a, T> {
    pub fn new(tree: &'a T) -> Self {
        Self { tree }
    }

    /// Build an anchor for `range`, whose rendered text is `selected_text`
    ///
    /// Returns `Ok(None)` for a collapsed range or a selection that is blank
    /// after trimming. A detached endpoint fails this call only.
    pub fn build(
        &self,
        range: &Range<T::Node>,
        selected_text: &str,
    ) -> Result<Option<Anchor>, DetachedNodeError> {
        if range.is_collapsed() {
            debug!("Ignoring collapsed selection");
            return Ok(None);
        }

        let text = selected_text.trim();
        if text.is_empty() {
            debug!("Ignoring blank selection");
            return Ok(None);
        }

        let start_path = compute_path(self.tree, range.start.node)?;
        let end_path = compute_path(self.tree, range.end.node)?;

        Ok(Some(Anchor {
            id: String::new(),
            text: text.to_string(),
            start_path,
            start_offset: range.start.offset,
            end_path,
            end_offset: range.end.offset,
        }))
    }
}
