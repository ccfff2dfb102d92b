//! Lazily connected, process-wide store handle
//!
//! The first request to need the store performs the connect; every later
//! request reuses the same handle. Concurrent first requests wait on the
//! single in-flight attempt rather than connecting in parallel. A failed
//! attempt leaves the handle empty so the next request starts over.

use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{error, info};

use crate::db::store::{DocumentStore, StoreConnector};
use crate::types::Result;

pub struct StoreHandle {
    connector: Arc<dyn StoreConnector>,
    store: OnceCell<Arc<dyn DocumentStore>>,
}

impl StoreHandle {
    pub fn new(connector: Arc<dyn StoreConnector>) -> Self {
        Self {
            connector,
            store: OnceCell::new(),
        }
    }

    /// Shared store, connecting first if no handle exists yet
    pub async fn acquire(&self) -> Result<Arc<dyn DocumentStore>> {
        let store = self
            .store
            .get_or_try_init(|| async {
                info!("Establishing document store connection");
                match self.connector.connect().await {
                    Ok(store) => {
                        info!("Document store connected");
                        Ok(store)
                    }
                    Err(e) => {
                        error!("Document store connection failed: {}", e);
                        Err(e)
                    }
                }
            })
            .await?;
        Ok(Arc::clone(store))
    }

    /// Whether a connection has been established. Never connects.
    pub fn is_connected(&self) -> bool {
        self.store.initialized()
    }
}
