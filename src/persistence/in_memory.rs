//! InMemoryDocumentStore - BTreeMap-backed document store for tests and local use.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use serde_json::Value;

use super::{Document, DocumentStore, PersistenceError, Versioned};

/// (collection, owner, id)
type DocumentKey = (String, String, String);

struct StoredDocument {
    bytes: Vec<u8>,
    version: u64,
}

/// In-memory document store.
///
/// Documents are kept as JSON bytes, ordered by collection, owner, then id.
/// Clone-friendly via Arc; clones share the same storage.
#[derive(Clone)]
pub struct InMemoryDocumentStore {
    storage: Arc<RwLock<BTreeMap<DocumentKey, StoredDocument>>>,
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self {
            storage: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }

    fn make_key(collection: &str, owner: &str, id: &str) -> DocumentKey {
        (collection.to_string(), owner.to_string(), id.to_string())
    }

    /// Number of documents across all owners and collections.
    pub fn len(&self) -> usize {
        self.storage.read().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned<T>(_: T) -> PersistenceError {
    PersistenceError::Storage("lock poisoned".into())
}

impl DocumentStore for InMemoryDocumentStore {
    fn get<D: Document>(
        &self,
        owner: &str,
        id: &str,
    ) -> Result<Option<Versioned<D>>, PersistenceError> {
        let key = Self::make_key(D::COLLECTION, owner, id);
        let storage = self.storage.read().map_err(poisoned)?;

        match storage.get(&key) {
            Some(stored) => {
                let data: D = serde_json::from_slice(&stored.bytes)
                    .map_err(|e| PersistenceError::Serde(e.to_string()))?;
                Ok(Some(Versioned {
                    data,
                    version: stored.version,
                }))
            }
            None => Ok(None),
        }
    }

    fn list<D: Document>(&self, owner: &str) -> Result<Vec<Versioned<D>>, PersistenceError> {
        let storage = self.storage.read().map_err(poisoned)?;
        let start = Self::make_key(D::COLLECTION, owner, "");

        let mut results = Vec::new();
        for ((collection, doc_owner, id), stored) in storage.range(start..) {
            if collection != D::COLLECTION || doc_owner != owner {
                break;
            }
            match serde_json::from_slice::<D>(&stored.bytes) {
                Ok(data) => results.push(Versioned {
                    data,
                    version: stored.version,
                }),
                Err(e) => {
                    tracing::warn!(
                        collection = %collection,
                        owner,
                        id = %id,
                        error = %e,
                        "skipping undecodable document"
                    );
                }
            }
        }

        Ok(results)
    }

    fn put<D: Document>(
        &self,
        owner: &str,
        document: &D,
        expected_version: Option<u64>,
    ) -> Result<u64, PersistenceError> {
        let key = Self::make_key(D::COLLECTION, owner, document.id());
        let bytes =
            serde_json::to_vec(document).map_err(|e| PersistenceError::Serde(e.to_string()))?;

        let mut storage = self.storage.write().map_err(poisoned)?;

        let actual = storage.get(&key).map(|s| s.version).unwrap_or(0);
        if let Some(expected) = expected_version {
            if expected != actual {
                return Err(PersistenceError::Conflict {
                    collection: D::COLLECTION.to_string(),
                    id: document.id().to_string(),
                    expected,
                    actual,
                });
            }
        }

        let new_version = actual + 1;
        storage.insert(
            key,
            StoredDocument {
                bytes,
                version: new_version,
            },
        );

        Ok(new_version)
    }

    fn merge<D: Document>(
        &self,
        owner: &str,
        id: &str,
        patch: &Value,
    ) -> Result<u64, PersistenceError> {
        let Value::Object(patch) = patch else {
            return Err(PersistenceError::Serde(
                "merge patch must be a JSON object".into(),
            ));
        };

        let key = Self::make_key(D::COLLECTION, owner, id);
        let mut storage = self.storage.write().map_err(poisoned)?;

        let (mut fields, version) = match storage.get(&key) {
            Some(stored) => {
                let value: Value = serde_json::from_slice(&stored.bytes)
                    .map_err(|e| PersistenceError::Serde(e.to_string()))?;
                match value {
                    Value::Object(fields) => (fields, stored.version),
                    _ => (serde_json::Map::new(), stored.version),
                }
            }
            None => (serde_json::Map::new(), 0),
        };

        for (name, value) in patch {
            fields.insert(name.clone(), value.clone());
        }

        let bytes = serde_json::to_vec(&Value::Object(fields))
            .map_err(|e| PersistenceError::Serde(e.to_string()))?;
        let new_version = version + 1;
        storage.insert(
            key,
            StoredDocument {
                bytes,
                version: new_version,
            },
        );

        Ok(new_version)
    }

    fn delete<D: Document>(&self, owner: &str, id: &str) -> Result<bool, PersistenceError> {
        let key = Self::make_key(D::COLLECTION, owner, id);
        let mut storage = self.storage.write().map_err(poisoned)?;

        Ok(storage.remove(&key).is_some())
    }
}
