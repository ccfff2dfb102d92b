//! In-memory document store
//!
//! Backs `--dev-mode` and the test-suite. Supports the subset of MongoDB
//! semantics the routes use: top-level equality filters, multi-key sort,
//! `$set` updates and generated `ObjectId`s.

use async_trait::async_trait;
use bson::{oid::ObjectId, Bson, Document};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info};

use crate::db::store::{DocumentStore, StoreConnector, UpdateOutcome};
use crate::types::{MediasiteError, Result};

/// Collections keyed by name, documents kept in insertion order
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<Document>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<String, Vec<Document>>>> {
        self.collections
            .read()
            .map_err(|_| MediasiteError::Internal("memory store lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<String, Vec<Document>>>> {
        self.collections
            .write()
            .map_err(|_| MediasiteError::Internal("memory store lock poisoned".into()))
    }
}

fn filter_matches(document: &Document, filter: &Document) -> bool {
    filter
        .iter()
        .all(|(key, expected)| document.get(key) == Some(expected))
}

/// Rough MongoDB type ordering: null < numbers < strings < ObjectId < bool < date
fn type_rank(value: Option<&Bson>) -> u8 {
    match value {
        None | Some(Bson::Null) => 0,
        Some(Bson::Int32(_)) | Some(Bson::Int64(_)) | Some(Bson::Double(_)) => 1,
        Some(Bson::String(_)) => 2,
        Some(Bson::ObjectId(_)) => 3,
        Some(Bson::Boolean(_)) => 4,
        Some(Bson::DateTime(_)) => 5,
        Some(_) => 6,
    }
}

fn as_f64(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(i) => Some(f64::from(*i)),
        Bson::Int64(i) => Some(*i as f64),
        Bson::Double(f) => Some(*f),
        _ => None,
    }
}

fn compare_values(a: Option<&Bson>, b: Option<&Bson>) -> Ordering {
    let by_type = type_rank(a).cmp(&type_rank(b));
    if by_type != Ordering::Equal {
        return by_type;
    }
    match (a, b) {
        (Some(Bson::String(x)), Some(Bson::String(y))) => x.cmp(y),
        (Some(Bson::Boolean(x)), Some(Bson::Boolean(y))) => x.cmp(y),
        (Some(Bson::DateTime(x)), Some(Bson::DateTime(y))) => {
            x.timestamp_millis().cmp(&y.timestamp_millis())
        }
        (Some(Bson::ObjectId(x)), Some(Bson::ObjectId(y))) => x.bytes().cmp(&y.bytes()),
        (Some(x), Some(y)) => match (as_f64(x), as_f64(y)) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            _ => Ordering::Equal,
        },
        _ => Ordering::Equal,
    }
}

fn is_descending(direction: &Bson) -> bool {
    match direction {
        Bson::Int32(n) => *n < 0,
        Bson::Int64(n) => *n < 0,
        Bson::Double(f) => *f < 0.0,
        _ => false,
    }
}

fn sort_documents(documents: &mut [Document], sort: &Document) {
    documents.sort_by(|a, b| {
        for (field, direction) in sort {
            let ordering = compare_values(a.get(field), b.get(field));
            let ordering = if is_descending(direction) {
                ordering.reverse()
            } else {
                ordering
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find(
        &self,
        collection: &str,
        filter: Document,
        sort: Option<Document>,
    ) -> Result<Vec<Document>> {
        let collections = self.read()?;
        let mut found: Vec<Document> = collections
            .get(collection)
            .map(|docs| docs.iter().filter(|d| filter_matches(d, &filter)).cloned().collect())
            .unwrap_or_default();
        if let Some(sort) = sort {
            sort_documents(&mut found, &sort);
        }
        Ok(found)
    }

    async fn find_one(&self, collection: &str, filter: Document) -> Result<Option<Document>> {
        let collections = self.read()?;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|d| filter_matches(d, &filter)).cloned()))
    }

    async fn insert_one(&self, collection: &str, document: Document) -> Result<Bson> {
        let mut collections = self.write()?;
        let docs = collections.entry(collection.to_string()).or_default();

        let id = document
            .get("_id")
            .cloned()
            .unwrap_or_else(|| Bson::ObjectId(ObjectId::new()));
        if docs.iter().any(|d| d.get("_id") == Some(&id)) {
            return Err(MediasiteError::Database(format!(
                "duplicate key in {}: _id {}",
                collection, id
            )));
        }

        let mut stored = Document::new();
        stored.insert("_id", id.clone());
        for (key, value) in document {
            if key != "_id" {
                stored.insert(key, value);
            }
        }
        docs.push(stored);
        debug!(collection, %id, "memory store insert");
        Ok(id)
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: Document,
        update: Document,
    ) -> Result<UpdateOutcome> {
        let mut set = Document::new();
        for (operator, fields) in update {
            match (operator.as_str(), fields) {
                ("$set", Bson::Document(fields)) => {
                    for (key, value) in fields {
                        set.insert(key, value);
                    }
                }
                (other, _) => {
                    return Err(MediasiteError::Database(format!(
                        "unsupported update operator: {}",
                        other
                    )))
                }
            }
        }

        let mut collections = self.write()?;
        let Some(target) = collections
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|d| filter_matches(d, &filter)))
        else {
            return Ok(UpdateOutcome::default());
        };

        let mut modified = false;
        for (key, value) in set {
            if target.get(&key) != Some(&value) {
                target.insert(key, value);
                modified = true;
            }
        }

        Ok(UpdateOutcome {
            matched: 1,
            modified: u64::from(modified),
        })
    }

    async fn count_documents(&self, collection: &str, filter: Document) -> Result<u64> {
        let collections = self.read()?;
        Ok(collections
            .get(collection)
            .map(|docs| docs.iter().filter(|d| filter_matches(d, &filter)).count() as u64)
            .unwrap_or(0))
    }
}

/// Hands out a shared [`MemoryStore`]
pub struct MemoryConnector {
    store: Arc<MemoryStore>,
}

impl MemoryConnector {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl StoreConnector for MemoryConnector {
    async fn connect(&self) -> Result<Arc<dyn DocumentStore>> {
        info!("Using in-memory document store");
        let store: Arc<dyn DocumentStore> = self.store.clone();
        Ok(store)
    }
}
