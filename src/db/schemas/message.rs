//! Contact message document schema
//!
//! Stores messages submitted through the contact form.

use bson::{doc, oid::ObjectId, DateTime, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::IntoIndexes;

/// Collection name for contact messages
pub const MESSAGE_COLLECTION: &str = "messages";

/// Contact message stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct MessageDoc {
    /// MongoDB document ID
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    pub name: String,

    pub email: String,

    pub message: String,

    /// Submission time
    #[serde(rename = "createdAt")]
    pub created_at: DateTime,

    /// Whether the site owner has read the message
    #[serde(default)]
    pub read: bool,

    /// When the message was marked read
    #[serde(rename = "readAt", skip_serializing_if = "Option::is_none")]
    pub read_at: Option<DateTime>,
}

impl MessageDoc {
    /// New unread message stamped with the current time
    pub fn new(name: String, email: String, message: String) -> Self {
        Self {
            id: None,
            name,
            email,
            message,
            created_at: DateTime::now(),
            read: false,
            read_at: None,
        }
    }

    /// Newest first
    pub fn sort() -> Document {
        doc! { "createdAt": -1 }
    }

    /// `$set` update marking a message read at `at`
    pub fn mark_read_update(at: DateTime) -> Document {
        doc! { "$set": { "read": true, "readAt": at } }
    }
}

impl IntoIndexes for MessageDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![(doc! { "createdAt": -1 }, None)]
    }
}
