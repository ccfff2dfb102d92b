//! Store trait definitions

use async_trait::async_trait;
use bson::{Bson, Document};
use std::sync::Arc;

use crate::types::Result;

/// Matched/modified counts reported by an update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UpdateOutcome {
    pub matched: u64,
    pub modified: u64,
}

/// Operations the facade issues against a document store.
///
/// Filters are MongoDB filter documents. Sort documents map field names to
/// `1` (ascending) or `-1` (descending).
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// All documents in `collection` matching `filter`, optionally sorted
    async fn find(
        &self,
        collection: &str,
        filter: Document,
        sort: Option<Document>,
    ) -> Result<Vec<Document>>;

    /// First document matching `filter`
    async fn find_one(&self, collection: &str, filter: Document) -> Result<Option<Document>>;

    /// Insert a document, returning its `_id`
    async fn insert_one(&self, collection: &str, document: Document) -> Result<Bson>;

    /// Apply `update` to the first document matching `filter`
    async fn update_one(
        &self,
        collection: &str,
        filter: Document,
        update: Document,
    ) -> Result<UpdateOutcome>;

    /// Number of documents matching `filter`
    async fn count_documents(&self, collection: &str, filter: Document) -> Result<u64>;
}

/// Establishes the connection behind a [`crate::db::StoreHandle`]
#[async_trait]
pub trait StoreConnector: Send + Sync {
    async fn connect(&self) -> Result<Arc<dyn DocumentStore>>;
}
