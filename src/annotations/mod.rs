//! Annotation management
//!
//! Stores annotations (identified anchors with notes) and keeps the persisted
//! copy in step with every add, update and remove.

mod identity;
mod shared;
mod store;
mod types;

pub use identity::{IdentityProvider, SequentialIdentity, UuidIdentity};
pub use shared::SharedStore;
pub use store::AnnotationStore;
pub use types::Annotation;
