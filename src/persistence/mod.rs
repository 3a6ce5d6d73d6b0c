//! Annotation persistence
//!
//! The whole annotation set is stored as one JSON array under one key. Every
//! save re-serializes the full set; there are no partial writes.
//!
//! Loading is lenient: a missing key or a malformed payload both come back as
//! an empty set, with the parse failure logged. Callers that need to tell the
//! two apart use [`PersistenceBridge::load_strict`].

pub mod kv;
mod queue;

pub use kv::{FileKeyValue, KeyValueStore, MemoryKeyValue};
pub use queue::QueuedBridge;

use tracing::{debug, warn};

use crate::annotations::Annotation;
use crate::error::{PersistError, PersistResult};

/// Default key the annotation set is stored under
pub const DEFAULT_STORAGE_KEY: &str = "marginalia-annotations";

/// Loads and saves the full annotation set
pub trait PersistenceBridge {
    /// Read the stored set, surfacing malformed payloads
    fn load_strict(&self) -> PersistResult<Vec<Annotation>>;

    /// Overwrite the stored set
    fn save(&self, annotations: &[Annotation]) -> PersistResult<()>;

    /// Read the stored set, treating any failure as empty
    fn load(&self) -> Vec<Annotation> {
        match self.load_strict() {
            Ok(annotations) => annotations,
            Err(e) => {
                warn!("Discarding unreadable annotations: {}", e);
                Vec::new()
            }
        }
    }
}

impl<B: PersistenceBridge + ?Sized> PersistenceBridge for Box<B> {
    fn load_strict(&self) -> PersistResult<Vec<Annotation>> {
        (**self).load_strict()
    }

    fn save(&self, annotations: &[Annotation]) -> PersistResult<()> {
        (**self).save(annotations)
    }

    fn load(&self) -> Vec<Annotation> {
        (**self).load()
    }
}

/// Serialize the annotation set to its stored form
pub fn encode(annotations: &[Annotation]) -> PersistResult<String> {
    Ok(serde_json::to_string(annotations)?)
}

/// Parse a stored payload; `None` means the key was never written
pub fn decode(key: &str, payload: Option<&str>) -> PersistResult<Vec<Annotation>> {
    match payload {
        None => Ok(Vec::new()),
        Some(raw) => serde_json::from_str(raw).map_err(|source| PersistError::Load {
            key: key.to_string(),
            source,
        }),
    }
}

/// Synchronous bridge over a [`KeyValueStore`] slot
#[derive(Debug, Clone)]
pub struct KeyValueBridge<S> {
    store: S,
    key: String,
}

impl<S: KeyValueStore> KeyValueBridge<S> {
    pub fn new(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// Bridge using [`DEFAULT_STORAGE_KEY`]
    pub fn with_default_key(store: S) -> Self {
        Self::new(store, DEFAULT_STORAGE_KEY)
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl<S: KeyValueStore> PersistenceBridge for KeyValueBridge<S> {
    fn load_strict(&self) -> PersistResult<Vec<Annotation>> {
        let payload = self.store.get(&self.key)?;
        let annotations = decode(&self.key, payload.as_deref())?;
        debug!(key = %self.key, count = annotations.len(), "Loaded annotations");
        Ok(annotations)
    }

    fn save(&self, annotations: &[Annotation]) -> PersistResult<()> {
        let payload = encode(annotations)?;
        self.store.set(&self.key, &payload)?;
        debug!(key = %self.key, count = annotations.len(), "Saved annotations");
        Ok(())
    }
}
