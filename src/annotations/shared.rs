//! Thread-safe handle to an annotation store

use parking_lot::Mutex;
use std::sync::Arc;

use super::identity::{IdentityProvider, UuidIdentity};
use super::store::AnnotationStore;
use super::types::Annotation;
use crate::anchor::Anchor;
use crate::error::PersistResult;
use crate::persistence::PersistenceBridge;

/// Cloneable handle; every operation runs under one lock, including the save
pub struct SharedStore<B, I = UuidIdentity> {
    inner: Arc<Mutex<AnnotationStore<B, I>>>,
}

impl<B, I> Clone for SharedStore<B, I> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<B, I> SharedStore<B, I>
where
    B: PersistenceBridge,
    I: IdentityProvider,
{
    pub fn new(store: AnnotationStore<B, I>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    pub fn list(&self) -> Vec<Annotation> {
        self.inner.lock().list()
    }

    pub fn add(&self, anchor: Anchor) -> PersistResult<String> {
        self.inner.lock().add(anchor)
    }

    pub fn update(&self, id: &str, note: impl Into<String>) -> PersistResult<()> {
        self.inner.lock().update(id, note)
    }

    pub fn remove(&self, id: &str) -> PersistResult<()> {
        self.inner.lock().remove(id)
    }

    /// Run `f` with exclusive access to the store
    pub fn with<R>(&self, f: impl FnOnce(&mut AnnotationStore<B, I>) -> R) -> R {
        f(&mut self.inner.lock())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotations::SequentialIdentity;
    use crate::persistence::{KeyValueBridge, MemoryKeyValue};
    use std::collections::HashSet;
    use std::thread;

    #[test]
    fn test_concurrent_adds_all_persist() {
        let kv = Arc::new(MemoryKeyValue::new());
        let store = SharedStore::new(AnnotationStore::new(
            KeyValueBridge::new(Arc::clone(&kv), "k"),
            SequentialIdentity::new("t"),
        ));

        let handles: Vec<_> = (0..4)
            .map(|worker| {
                let store = store.clone();
                thread::spawn(move || {
                    for i in 0..25 {
                        let text = format!("w{}-{}", worker, i);
                        store.add(Anchor::within(text, vec![0], 0, 1)).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let list = store.list();
        assert_eq!(list.len(), 100);
        let ids: HashSet<_> = list.iter().map(|a| a.id().to_string()).collect();
        assert_eq!(ids.len(), 100);

        // the last save holds the full set
        let reopened = AnnotationStore::open(KeyValueBridge::new(kv, "k"));
        assert_eq!(reopened.list(), list);
    }

    #[test]
    fn test_with_gives_exclusive_access() {
        let store = SharedStore::new(AnnotationStore::open(KeyValueBridge::new(
            MemoryKeyValue::new(),
            "k",
        )));
        let id = store.add(Anchor::within("x", vec![0], 0, 1)).unwrap();
        store.update(&id, "note").unwrap();

        let note = store.with(|s| s.get(&id).and_then(|a| a.note()).map(str::to_string));
        assert_eq!(note.as_deref(), Some("note"));

        store.remove(&id).unwrap();
        assert!(store.with(|s| s.is_empty()));
    }
}
