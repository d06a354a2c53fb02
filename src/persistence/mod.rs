//! Persistence - owner-scoped document storage behind saved views.
//!
//! Every document belongs to an owner (the signed-in user) and a collection.
//! Writes carry an optional expected version for optimistic concurrency.
//!
//! ## Example
//!
//! ```ignore
//! use mtg_library::{Document, DocumentStore, InMemoryDocumentStore};
//!
//! #[derive(Serialize, Deserialize, Clone, Document)]
//! #[document(collection = "views")]
//! struct SavedView {
//!     pub id: String,
//!     pub name: String,
//! }
//!
//! let store = InMemoryDocumentStore::new();
//! let version = store.put("user-1", &view, Some(0))?;
//! let loaded = store.get::<SavedView>("user-1", &view.id)?;
//! ```

mod in_memory;
mod views;

use serde::{de::DeserializeOwned, Serialize};

/// A type stored as a document in a named collection.
pub trait Document: Serialize + DeserializeOwned + Clone + Send + Sync {
    /// Collection the document lives in (e.g. "views", "settings").
    const COLLECTION: &'static str;

    /// Identifier, unique within the collection for one owner.
    fn id(&self) -> &str;
}

/// A document together with the version it was read at.
#[derive(Debug, Clone, PartialEq)]
pub struct Versioned<T> {
    pub data: T,
    pub version: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PersistenceError {
    /// Optimistic concurrency conflict. `expected == 0` means the write
    /// required the document to be absent.
    #[error("version conflict on {collection}/{id} (expected version {expected}, actual {actual})")]
    Conflict {
        collection: String,
        id: String,
        expected: u64,
        actual: u64,
    },

    #[error("document serialization error: {0}")]
    Serde(String),

    #[error("document storage error: {0}")]
    Storage(String),
}

/// Owner-scoped CRUD storage for documents.
pub trait DocumentStore: Send + Sync {
    /// Get a document by id. `None` if it does not exist.
    fn get<D: Document>(&self, owner: &str, id: &str)
        -> Result<Option<Versioned<D>>, PersistenceError>;

    /// All of an owner's documents in a collection, ordered by id.
    fn list<D: Document>(&self, owner: &str) -> Result<Vec<Versioned<D>>, PersistenceError>;

    /// Write a whole document and return its new version.
    ///
    /// `expected_version`:
    /// - `None` writes unconditionally.
    /// - `Some(0)` requires the document not to exist yet.
    /// - `Some(v)` requires the stored version to be `v`.
    fn put<D: Document>(
        &self,
        owner: &str,
        document: &D,
        expected_version: Option<u64>,
    ) -> Result<u64, PersistenceError>;

    /// Shallow merge of a JSON object into a document, creating it when absent.
    ///
    /// Top-level keys in `patch` replace the stored ones; every other stored
    /// key is kept.
    fn merge<D: Document>(
        &self,
        owner: &str,
        id: &str,
        patch: &serde_json::Value,
    ) -> Result<u64, PersistenceError>;

    /// Delete a document. Returns true if it existed.
    fn delete<D: Document>(&self, owner: &str, id: &str) -> Result<bool, PersistenceError>;
}

pub use in_memory::InMemoryDocumentStore;
pub use views::{SettingsPatch, UserSettings, ViewPersistence};
