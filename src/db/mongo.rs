//! MongoDB client and store implementation

use async_trait::async_trait;
use bson::{doc, Bson, Document};
use futures_util::TryStreamExt;
use mongodb::options::{ClientOptions, IndexOptions};
use mongodb::{Client, Collection, IndexModel};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::db::schemas::{MessageDoc, MESSAGE_COLLECTION};
use crate::db::store::{DocumentStore, StoreConnector, UpdateOutcome};
use crate::types::{MediasiteError, Result};

/// Trait for schemas that provide index definitions
pub trait IntoIndexes {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)>;
}

/// Server selection and connect timeout; the driver default is 30s
const CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

/// Parse `uri` and cap how long an unreachable server can stall a request
pub async fn client_options(uri: &str) -> Result<ClientOptions> {
    let mut options = ClientOptions::parse(uri).await?;
    options.server_selection_timeout = Some(CONNECT_TIMEOUT);
    options.connect_timeout = Some(CONNECT_TIMEOUT);
    Ok(options)
}

/// MongoDB client wrapper
#[derive(Clone)]
pub struct MongoClient {
    client: Client,
    db_name: String,
}

impl MongoClient {
    /// Connect and verify the server answers a ping
    pub async fn new(uri: &str, db_name: &str) -> Result<Self> {
        info!("Connecting to MongoDB database '{}'", db_name);

        let options = client_options(uri).await?;
        let client = Client::with_options(options)
            .map_err(|e| MediasiteError::Database(format!("Failed to connect to MongoDB: {}", e)))?;

        client
            .database(db_name)
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| MediasiteError::Database(format!("MongoDB ping failed: {}", e)))?;

        info!("Connected to MongoDB database '{}'", db_name);

        Ok(Self {
            client,
            db_name: db_name.to_string(),
        })
    }

    /// Untyped collection handle
    pub fn collection(&self, name: &str) -> Collection<Document> {
        self.client.database(&self.db_name).collection(name)
    }

    /// Create the schema-declared indexes for `T` on `collection_name`
    pub async fn apply_indexes<T: IntoIndexes>(&self, collection_name: &str) -> Result<()> {
        let schema_indices = T::into_indices();

        if schema_indices.is_empty() {
            return Ok(());
        }

        let indices: Vec<IndexModel> = schema_indices
            .into_iter()
            .map(|(keys, opts)| IndexModel::builder().keys(keys).options(opts).build())
            .collect();

        self.collection(collection_name)
            .create_indexes(indices)
            .await
            .map_err(|e| MediasiteError::Database(format!("Failed to create indexes: {}", e)))?;

        Ok(())
    }
}

/// [`DocumentStore`] over a live MongoDB database
pub struct MongoStore {
    client: MongoClient,
}

impl MongoStore {
    pub fn new(client: MongoClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn find(
        &self,
        collection: &str,
        filter: Document,
        sort: Option<Document>,
    ) -> Result<Vec<Document>> {
        let coll = self.client.collection(collection);
        let mut action = coll.find(filter);
        if let Some(sort) = sort {
            action = action.sort(sort);
        }
        let cursor = action.await?;

        Ok(cursor.try_collect().await?)
    }

    async fn find_one(&self, collection: &str, filter: Document) -> Result<Option<Document>> {
        Ok(self.client.collection(collection).find_one(filter).await?)
    }

    async fn insert_one(&self, collection: &str, document: Document) -> Result<Bson> {
        let result = self
            .client
            .collection(collection)
            .insert_one(document)
            .await?;

        Ok(result.inserted_id)
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: Document,
        update: Document,
    ) -> Result<UpdateOutcome> {
        let result = self
            .client
            .collection(collection)
            .update_one(filter, update)
            .await?;

        Ok(UpdateOutcome {
            matched: result.matched_count,
            modified: result.modified_count,
        })
    }

    async fn count_documents(&self, collection: &str, filter: Document) -> Result<u64> {
        Ok(self
            .client
            .collection(collection)
            .count_documents(filter)
            .await?)
    }
}

/// Connects a [`MongoStore`] from a URI and database name
pub struct MongoConnector {
    uri: String,
    db_name: String,
}

impl MongoConnector {
    pub fn new(uri: impl Into<String>, db_name: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            db_name: db_name.into(),
        }
    }
}

#[async_trait]
impl StoreConnector for MongoConnector {
    async fn connect(&self) -> Result<Arc<dyn DocumentStore>> {
        let client = MongoClient::new(&self.uri, &self.db_name).await?;

        if let Err(e) = client.apply_indexes::<MessageDoc>(MESSAGE_COLLECTION).await {
            warn!("Message indexes not applied: {}", e);
        }

        let store: Arc<dyn DocumentStore> = Arc::new(MongoStore::new(client));
        Ok(store)
    }
}
