//! Document store access
//!
//! Routes talk to a [`DocumentStore`] obtained from the shared
//! [`StoreHandle`], which connects lazily on first use.

pub mod handle;
pub mod id;
pub mod json;
pub mod memory;
pub mod mongo;
pub mod schemas;
pub mod store;

pub use handle::StoreHandle;
pub use id::DocumentId;
pub use json::{bson_to_json, document_to_json, documents_to_json};
pub use memory::{MemoryConnector, MemoryStore};
pub use mongo::{MongoClient, MongoConnector, MongoStore};
pub use store::{DocumentStore, StoreConnector, UpdateOutcome};
