//! Marginalia
//!
//! Durable text anchors over rendered document trees, and an annotation store
//! that keeps them, with optional notes, in a key-value slot.
//!
//! - [`tree`]: the tree capability and node paths
//! - [`anchor`]: anchors, the anchor builder and selection-driven highlighting
//! - [`annotations`]: the annotation store and id providers
//! - [`persistence`]: bridges between the store and durable storage
//! - [`document`]: an XHTML arena tree for hosts without a DOM of their own
//! - [`sidebar`]: view model for listing and editing annotations

pub mod anchor;
pub mod annotations;
pub mod config;
pub mod document;
pub mod error;
pub mod persistence;
pub mod sidebar;
pub mod tree;

pub use anchor::{compare_anchors, Anchor, AnchorBuilder, Position, Range, Selection};
pub use annotations::{Annotation, AnnotationStore, IdentityProvider, SharedStore};
pub use error::{DetachedNodeError, DocumentError, PersistError, PersistResult};
