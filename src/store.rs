use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::RwLock;

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("store lock poisoned")]
    Poisoned,
    #[error("seed document in collection {0:?} is missing a string \"id\" field")]
    MissingDocId(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Capability interface over the document store. Collections hold JSON
/// documents addressed by an opaque string id; `upsert` creates or
/// overwrites, nothing is ever deleted.
pub trait DocumentStore: Send + Sync {
    /// Every document in the collection, in store order.
    fn list(&self, collection: &str) -> Result<Vec<Value>, StoreError>;

    /// A single document, or `None` when the id is absent.
    fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError>;

    /// Create-or-overwrite under a fixed id.
    fn upsert(&self, collection: &str, id: &str, data: Value) -> Result<(), StoreError>;
}

struct StoredDoc {
    id: String,
    data: Value,
}

/// In-memory document store. Each collection is an insertion-ordered list
/// of records, so `list` reproduces the order documents were written in.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<StoredDoc>>>,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }
}

impl DocumentStore for MemoryStore {
    fn list(&self, collection: &str) -> Result<Vec<Value>, StoreError> {
        let collections = self.collections.read().map_err(|_| StoreError::Poisoned)?;

        Ok(collections
            .get(collection)
            .map(|docs| docs.iter().map(|doc| doc.data.clone()).collect())
            .unwrap_or_default())
    }

    fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        let collections = self.collections.read().map_err(|_| StoreError::Poisoned)?;

        Ok(collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|doc| doc.id == id))
            .map(|doc| doc.data.clone()))
    }

    fn upsert(&self, collection: &str, id: &str, data: Value) -> Result<(), StoreError> {
        let mut collections = self.collections.write().map_err(|_| StoreError::Poisoned)?;
        let docs = collections.entry(collection.to_owned()).or_default();

        match docs.iter_mut().find(|doc| doc.id == id) {
            Some(doc) => doc.data = data,
            None => docs.push(StoredDoc {
                id: id.to_owned(),
                data,
            }),
        }

        Ok(())
    }
}

/// Seed file shape: collection name to an array of documents, each carrying
/// its own `"id"` field.
pub type SeedData = HashMap<String, Vec<serde_json::Map<String, Value>>>;

/// Loads a JSON seed file into the store. Returns the number of documents
/// written.
pub fn load_seed(store: &dyn DocumentStore, path: &Path) -> Result<usize, StoreError> {
    let file = fs::File::open(path)?;
    let reader = io::BufReader::new(file);
    let seed: SeedData = serde_json::from_reader(reader)?;

    apply_seed(store, seed)
}

pub fn apply_seed(store: &dyn DocumentStore, seed: SeedData) -> Result<usize, StoreError> {
    let mut written = 0;

    for (collection, docs) in seed {
        for doc in docs {
            let id = doc
                .get("id")
                .and_then(Value::as_str)
                .ok_or_else(|| StoreError::MissingDocId(collection.clone()))?
                .to_owned();

            store.upsert(&collection, &id, Value::Object(doc))?;
            written += 1;
        }
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn get_returns_none_for_absent_id() {
        let store = MemoryStore::new();
        assert!(store.get("movies", "1865").unwrap().is_none());
    }

    #[test]
    fn list_preserves_insertion_order() {
        let store = MemoryStore::new();
        store
            .upsert("movies", "2501", json!({"id": "2501", "title": "Second"}))
            .unwrap();
        store
            .upsert("movies", "1865", json!({"id": "1865", "title": "First"}))
            .unwrap();

        let docs = store.list("movies").unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0]["id"], "2501");
        assert_eq!(docs[1]["id"], "1865");
    }

    #[test]
    fn upsert_overwrites_in_place() {
        let store = MemoryStore::new();
        store
            .upsert("ratings", "testUser:1865", json!({"score": 5}))
            .unwrap();
        store
            .upsert("ratings", "testUser:1865", json!({"score": 3}))
            .unwrap();

        let docs = store.list("ratings").unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0], json!({"score": 3}));
    }

    #[test]
    fn list_of_unknown_collection_is_empty() {
        let store = MemoryStore::new();
        assert!(store.list("keywords").unwrap().is_empty());
    }

    #[test]
    fn apply_seed_writes_every_document() {
        let store = MemoryStore::new();
        let seed: SeedData = serde_json::from_value(json!({
            "movies": [
                {"id": "1865", "title": "On Stranger Tides"},
                {"id": "2501", "title": "The Bourne Identity"}
            ],
            "keywords": [
                {"id": "1865", "keywords": [{"id": "911", "name": "exotic island"}]}
            ]
        }))
        .unwrap();

        let written = apply_seed(&store, seed).unwrap();
        assert_eq!(written, 3);
        assert_eq!(store.list("movies").unwrap().len(), 2);
        assert!(store.get("keywords", "1865").unwrap().is_some());
    }

    #[test]
    fn apply_seed_rejects_documents_without_id() {
        let store = MemoryStore::new();
        let seed: SeedData =
            serde_json::from_value(json!({"movies": [{"title": "No Id"}]})).unwrap();

        match apply_seed(&store, seed) {
            Err(StoreError::MissingDocId(collection)) => assert_eq!(collection, "movies"),
            other => panic!("expected MissingDocId, got {:?}", other),
        }
    }
}
