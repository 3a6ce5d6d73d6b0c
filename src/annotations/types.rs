//! Annotation types
//!
//! An annotation is an anchor that a store has given an id, plus an optional
//! note. On disk it is the anchor's fields with an extra optional `note`.

use serde::{Deserialize, Serialize};

use crate::anchor::Anchor;

/// A stored, identified anchor with an optional note
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    #[serde(flatten)]
    pub anchor: Anchor,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Annotation {
    /// Promote an anchor, replacing any id it carried
    pub fn from_anchor(mut anchor: Anchor, id: impl Into<String>) -> Self {
        anchor.id = id.into();
        Self { anchor, note: None }
    }

    /// Set the note
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.anchor.id
    }

    pub fn text(&self) -> &str {
        &self.anchor.text
    }

    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }
}
