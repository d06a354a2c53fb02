//! A document store that can be switched offline.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use mtg_library::{
    Document, DocumentStore, InMemoryDocumentStore, PersistenceError, SessionState, Versioned,
};

/// Wraps an [`InMemoryDocumentStore`]; while offline every call fails with a
/// storage error and nothing is written.
#[derive(Clone, Default)]
pub struct FlakyStore {
    inner: InMemoryDocumentStore,
    offline: Arc<AtomicBool>,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn inner(&self) -> &InMemoryDocumentStore {
        &self.inner
    }

    fn check(&self) -> Result<(), PersistenceError> {
        if self.offline.load(Ordering::SeqCst) {
            Err(PersistenceError::Storage("offline".into()))
        } else {
            Ok(())
        }
    }
}

impl DocumentStore for FlakyStore {
    fn get<D: Document>(
        &self,
        owner: &str,
        id: &str,
    ) -> Result<Option<Versioned<D>>, PersistenceError> {
        self.check()?;
        self.inner.get(owner, id)
    }

    fn list<D: Document>(&self, owner: &str) -> Result<Vec<Versioned<D>>, PersistenceError> {
        self.check()?;
        self.inner.list(owner)
    }

    fn put<D: Document>(
        &self,
        owner: &str,
        document: &D,
        expected_version: Option<u64>,
    ) -> Result<u64, PersistenceError> {
        self.check()?;
        self.inner.put(owner, document, expected_version)
    }

    fn merge<D: Document>(
        &self,
        owner: &str,
        id: &str,
        patch: &serde_json::Value,
    ) -> Result<u64, PersistenceError> {
        self.check()?;
        self.inner.merge::<D>(owner, id, patch)
    }

    fn delete<D: Document>(&self, owner: &str, id: &str) -> Result<bool, PersistenceError> {
        self.check()?;
        self.inner.delete::<D>(owner, id)
    }
}

pub fn signed_in(owner: &str) -> SessionState {
    let mut session = SessionState::new();
    session.sign_in(owner);
    session
}
