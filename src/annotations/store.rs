//! In-memory annotation store
//!
//! Owns the ordered annotation set, assigns ids to incoming anchors and
//! writes the full set through its bridge after every mutation.

use std::collections::HashSet;
use tracing::{debug, warn};
use uuid::Uuid;

use super::identity::{IdentityProvider, UuidIdentity};
use super::types::Annotation;
use crate::anchor::Anchor;
use crate::error::PersistResult;
use crate::persistence::PersistenceBridge;

/// Attempts at drawing an unused id before falling back to a UUID
const MAX_ID_ATTEMPTS: usize = 8;

/// Ordered, identity-bearing annotation collection
///
/// Mutations take `&mut self`: a store has a single owner. Hosts that share a
/// store across threads wrap it in [`SharedStore`](super::SharedStore).
///
/// When a save fails the in-memory change is kept and the error is returned;
/// the next successful save writes it out.
pub struct AnnotationStore<B, I = UuidIdentity> {
    annotations: Vec<Annotation>,
    issued: HashSet<String>,
    bridge: B,
    identity: I,
}

impl<B: PersistenceBridge> AnnotationStore<B, UuidIdentity> {
    /// Store with UUID v4 ids
    pub fn open(bridge: B) -> Self {
        Self::new(bridge, UuidIdentity)
    }
}

impl<B, I> AnnotationStore<B, I>
where
    B: PersistenceBridge,
    I: IdentityProvider,
{
    /// Create a store seeded from `bridge.load()`
    pub fn new(bridge: B, identity: I) -> Self {
        let annotations = bridge.load();
        let issued = annotations.iter().map(|a| a.id().to_string()).collect();
        debug!(count = annotations.len(), "Opened annotation store");

        Self {
            annotations,
            issued,
            bridge,
            identity,
        }
    }

    /// Snapshot of the current ordered set
    pub fn list(&self) -> Vec<Annotation> {
        self.annotations.clone()
    }

    pub fn get(&self, id: &str) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.id() == id)
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    pub fn bridge(&self) -> &B {
        &self.bridge
    }

    /// Promote `anchor` to an annotation and append it
    ///
    /// Any id the anchor carried is replaced. Returns the assigned id.
    pub fn add(&mut self, anchor: Anchor) -> PersistResult<String> {
        let id = self.fresh_id();
        debug!(id = %id, text = %anchor.text, "Adding annotation");
        self.annotations.push(Annotation::from_anchor(anchor, id.clone()));
        self.persist()?;
        Ok(id)
    }

    /// Replace the note of annotation `id`; unknown ids are ignored
    pub fn update(&mut self, id: &str, note: impl Into<String>) -> PersistResult<()> {
        match self.annotations.iter_mut().find(|a| a.id() == id) {
            Some(annotation) => {
                annotation.note = Some(note.into());
                debug!(id = %id, "Updated annotation note");
            }
            None => debug!(id = %id, "Update for unknown annotation ignored"),
        }
        self.persist()
    }

    /// Delete annotation `id`; unknown ids are ignored
    pub fn remove(&mut self, id: &str) -> PersistResult<()> {
        let before = self.annotations.len();
        self.annotations.retain(|a| a.id() != id);
        if self.annotations.len() < before {
            debug!(id = %id, "Removed annotation");
        } else {
            debug!(id = %id, "Remove for unknown annotation ignored");
        }
        self.persist()
    }

    fn persist(&self) -> PersistResult<()> {
        self.bridge.save(&self.annotations)
    }

    /// Draw an id that no live or removed annotation has used
    fn fresh_id(&mut self) -> String {
        for _ in 0..MAX_ID_ATTEMPTS {
            let id = self.identity.new_id();
            if !id.is_empty() && self.issued.insert(id.clone()) {
                return id;
            }
            warn!(id = %id, "Identity provider returned an unusable id");
        }

        loop {
            let id = Uuid::new_v4().to_string();
            if self.issued.insert(id.clone()) {
                return id;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotations::SequentialIdentity;
    use crate::error::PersistError;
    use crate::persistence::{KeyValueBridge, KeyValueStore, MemoryKeyValue};
    use std::sync::Arc;

    type TestStore = AnnotationStore<KeyValueBridge<Arc<MemoryKeyValue>>, SequentialIdentity>;

    fn store_over(kv: &Arc<MemoryKeyValue>) -> TestStore {
        AnnotationStore::new(
            KeyValueBridge::new(Arc::clone(kv), "annotations"),
            SequentialIdentity::new("ann"),
        )
    }

    fn hello() -> Anchor {
        Anchor::within("hello", vec![0, 1], 0, 5)
    }

    fn payload(kv: &MemoryKeyValue) -> Option<String> {
        kv.get("annotations").unwrap()
    }

    #[test]
    fn test_add_assigns_id_without_note() {
        let kv = Arc::new(MemoryKeyValue::new());
        let mut store = store_over(&kv);

        store.add(hello()).unwrap();

        let list = store.list();
        assert_eq!(list.len(), 1);
        assert!(!list[0].id().is_empty());
        assert_eq!(list[0].text(), "hello");
        assert_eq!(list[0].anchor.start_path, vec![0, 1]);
        assert_eq!(list[0].anchor.end_offset, 5);
        assert_eq!(list[0].note(), None);
    }

    #[test]
    fn test_add_replaces_incoming_id() {
        let kv = Arc::new(MemoryKeyValue::new());
        let mut store = store_over(&kv);

        let mut anchor = hello();
        anchor.id = "caller-chosen".to_string();
        let id = store.add(anchor).unwrap();

        assert_eq!(id, "ann-1");
        assert!(store.get("caller-chosen").is_none());
    }

    #[test]
    fn test_each_mutation_saves() {
        let kv = Arc::new(MemoryKeyValue::new());
        let mut store = store_over(&kv);
        assert_eq!(payload(&kv), None);

        let id = store.add(hello()).unwrap();
        assert!(payload(&kv).unwrap().contains(&id));

        store.update(&id, "a note").unwrap();
        assert!(payload(&kv).unwrap().contains("a note"));

        store.remove(&id).unwrap();
        assert_eq!(payload(&kv).unwrap(), "[]");
    }

    #[test]
    fn test_update_missing_is_noop() {
        let kv = Arc::new(MemoryKeyValue::new());
        let mut store = store_over(&kv);

        store.update("missing-id", "x").unwrap();
        assert!(store.list().is_empty());
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let kv = Arc::new(MemoryKeyValue::new());
        let mut store = store_over(&kv);
        store.add(hello()).unwrap();

        store.remove("missing-id").unwrap();
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_update_is_idempotent() {
        let kv = Arc::new(MemoryKeyValue::new());
        let mut store = store_over(&kv);
        let id = store.add(hello()).unwrap();

        store.update(&id, "same").unwrap();
        let once = (store.list(), payload(&kv));
        store.update(&id, "same").unwrap();
        let twice = (store.list(), payload(&kv));

        assert_eq!(once, twice);
    }

    #[test]
    fn test_note_can_be_rewritten_and_emptied() {
        let kv = Arc::new(MemoryKeyValue::new());
        let mut store = store_over(&kv);
        let id = store.add(hello()).unwrap();

        store.update(&id, "first").unwrap();
        store.update(&id, "second").unwrap();
        assert_eq!(store.get(&id).unwrap().note(), Some("second"));

        store.update(&id, "").unwrap();
        assert_eq!(store.get(&id).unwrap().note(), Some(""));
    }

    #[test]
    fn test_add_then_remove_restores_state() {
        let kv = Arc::new(MemoryKeyValue::new());
        let mut store = store_over(&kv);
        store.add(Anchor::within("one", vec![0], 0, 3)).unwrap();
        store.add(Anchor::within("two", vec![1], 0, 3)).unwrap();

        let before = (store.list(), payload(&kv));
        let id = store.add(hello()).unwrap();
        store.remove(&id).unwrap();

        assert_eq!((store.list(), payload(&kv)), before);

        let next = store.add(hello()).unwrap();
        assert_ne!(next, id);
    }

    #[test]
    fn test_insertion_order_preserved() {
        let kv = Arc::new(MemoryKeyValue::new());
        let mut store = store_over(&kv);

        let ids: Vec<String> = ["a", "b", "c", "d"]
            .iter()
            .map(|t| store.add(Anchor::within(*t, vec![0], 0, 1)).unwrap())
            .collect();

        store.update(&ids[2], "note").unwrap();
        store.remove(&ids[1]).unwrap();
        store.add(Anchor::within("e", vec![0], 0, 1)).unwrap();

        let texts: Vec<_> = store.list().iter().map(|a| a.text().to_string()).collect();
        assert_eq!(texts, vec!["a", "c", "d", "e"]);
    }

    #[test]
    fn test_duplicate_text_allowed() {
        let kv = Arc::new(MemoryKeyValue::new());
        let mut store = store_over(&kv);
        let first = store.add(hello()).unwrap();
        let second = store.add(hello()).unwrap();

        assert_ne!(first, second);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_reopen_restores_annotations() {
        let kv = Arc::new(MemoryKeyValue::new());
        let id = {
            let mut store = store_over(&kv);
            let id = store.add(hello()).unwrap();
            store.update(&id, "persisted").unwrap();
            id
        };

        let reopened = AnnotationStore::open(KeyValueBridge::new(Arc::clone(&kv), "annotations"));
        assert_eq!(reopened.len(), 1);
        assert_eq!(reopened.get(&id).unwrap().note(), Some("persisted"));
    }

    #[test]
    fn test_reopened_store_never_reissues_loaded_ids() {
        let kv = Arc::new(MemoryKeyValue::new());
        {
            let mut store = store_over(&kv);
            store.add(hello()).unwrap();
        }

        // a fresh counter starts at ann-1 again
        let mut store = store_over(&kv);
        let id = store.add(hello()).unwrap();
        assert_eq!(id, "ann-2");
    }

    #[test]
    fn test_removed_ids_never_reused() {
        struct Repeating;
        impl IdentityProvider for Repeating {
            fn new_id(&self) -> String {
                "fixed".to_string()
            }
        }

        let kv = Arc::new(MemoryKeyValue::new());
        let mut store = AnnotationStore::new(KeyValueBridge::new(Arc::clone(&kv), "k"), Repeating);

        let first = store.add(hello()).unwrap();
        store.remove(&first).unwrap();
        let second = store.add(hello()).unwrap();

        assert_eq!(first, "fixed");
        assert_ne!(second, first);
        assert!(!second.is_empty());
    }

    #[test]
    fn test_malformed_payload_opens_empty() {
        let kv = Arc::new(MemoryKeyValue::new());
        kv.set("annotations", "{not valid json").unwrap();

        let store = store_over(&kv);
        assert!(store.list().is_empty());
    }

    #[test]
    fn test_save_failure_is_returned_and_state_kept() {
        let kv = Arc::new(MemoryKeyValue::new());
        let mut store = store_over(&kv);
        kv.set_read_only(true);

        let err = store.add(hello()).unwrap_err();
        assert!(matches!(err, PersistError::Save { .. }));
        assert_eq!(store.len(), 1);

        kv.set_read_only(false);
        store.update("missing", "x").unwrap();
        assert!(payload(&kv).unwrap().contains("hello"));
    }

    #[test]
    fn test_list_is_a_snapshot() {
        let kv = Arc::new(MemoryKeyValue::new());
        let mut store = store_over(&kv);
        let snapshot = store.list();
        store.add(hello()).unwrap();

        assert!(snapshot.is_empty());
        assert_eq!(store.list().len(), 1);
    }
}
