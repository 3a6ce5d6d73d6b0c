//! Presentation contract for an annotation list
//!
//! Hosts render [`SidebarEntry`] values however they like and route edits back
//! through [`SidebarActions`].

use std::fmt::Write;

use crate::annotations::Annotation;

/// View model for one annotation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidebarEntry {
    pub id: String,
    pub text: String,
    /// Editable note text, empty when the annotation has no note
    pub note: String,
    pub removable: bool,
}

/// One entry per annotation, in list order
///
/// `removable` reflects whether the host wired a remove callback.
pub fn entries(list: &[Annotation], removable: bool) -> Vec<SidebarEntry> {
    list.iter()
        .map(|a| SidebarEntry {
            id: a.id().to_string(),
            text: a.text().to_string(),
            note: a.note().unwrap_or_default().to_string(),
            removable,
        })
        .collect()
}

type UpdateFn<'a> = Box<dyn FnMut(&str, &str) + 'a>;
type RemoveFn<'a> = Box<dyn FnMut(&str) + 'a>;

/// Callbacks a sidebar invokes on user edits
pub struct SidebarActions<'a> {
    on_update: UpdateFn<'a>,
    on_remove: Option<RemoveFn<'a>>,
}

impl<'a> SidebarActions<'a> {
    pub fn new(on_update: impl FnMut(&str, &str) + 'a) -> Self {
        Self {
            on_update: Box::new(on_update),
            on_remove: None,
        }
    }

    pub fn with_remove(mut self, on_remove: impl FnMut(&str) + 'a) -> Self {
        self.on_remove = Some(Box::new(on_remove));
        self
    }

    pub fn can_remove(&self) -> bool {
        self.on_remove.is_some()
    }

    /// Entries for `list` with the removal affordance set from these actions
    pub fn entries(&self, list: &[Annotation]) -> Vec<SidebarEntry> {
        entries(list, self.can_remove())
    }

    /// Note edited for `id`
    pub fn update(&mut self, id: &str, note: &str) {
        (self.on_update)(id, note);
    }

    /// Remove requested for `id`; false when no remove callback is wired
    pub fn remove(&mut self, id: &str) -> bool {
        match self.on_remove.as_mut() {
            Some(on_remove) => {
                on_remove(id);
                true
            }
            None => false,
        }
    }
}

/// Render the list as a markdown bullet list
pub fn render_markdown(list: &[Annotation]) -> String {
    if list.is_empty() {
        return "_No annotations_\n".to_string();
    }

    let mut out = String::new();
    for entry in entries(list, false) {
        let _ = writeln!(out, "- **{}** `{}`", entry.text.trim(), entry.id);
        if !entry.note.is_empty() {
            for line in entry.note.lines() {
                let _ = writeln!(out, "  > {}", line);
            }
        }
    }
    out
}
