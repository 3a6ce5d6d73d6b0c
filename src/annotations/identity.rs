//! Annotation id generation

use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// Issues ids for new annotations
pub trait IdentityProvider {
    fn new_id(&self) -> String;
}

impl<T: IdentityProvider + ?Sized> IdentityProvider for Box<T> {
    fn new_id(&self) -> String {
        (**self).new_id()
    }
}

/// Random UUID v4 ids
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIdentity;

impl IdentityProvider for UuidIdentity {
    fn new_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Counter-based ids (`prefix-1`, `prefix-2`, ...)
#[derive(Debug)]
pub struct SequentialIdentity {
    prefix: String,
    next: AtomicU64,
}

impl SequentialIdentity {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self::starting_at(prefix, 1)
    }

    pub fn starting_at(prefix: impl Into<String>, first: u64) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicU64::new(first),
        }
    }
}

impl IdentityProvider for SequentialIdentity {
    fn new_id(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        format!("{}-{}", self.prefix, n)
    }
}
