//! Contact form and message inbox
//!
//! ## Routes
//!
//! - `POST /api/contact` - submit a message (201)
//! - `GET /api/messages` - all messages, newest first
//! - `GET /api/messages/{id}` - single message
//! - `PATCH /api/messages/{id}/read` - mark a message read
//!
//! Input is validated before the store is touched, so malformed submissions
//! get a 400 even while the database is unreachable.

use bson::{doc, DateTime};
use hyper::{Response, StatusCode};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use tracing::{debug, info};

use crate::db::schemas::{MessageDoc, MESSAGE_COLLECTION};
use crate::db::{bson_to_json, document_to_json, documents_to_json, DocumentId};
use crate::routes::content::find_by_id;
use crate::routes::response::{error_response, json_response, store_failure, FullBody};
use crate::server::AppState;
use crate::types::{MediasiteError, Result};

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

const MISSING_FIELDS: &str = "Name, email, and message are required";
const INVALID_EMAIL: &str = "Invalid email address";

/// Raw contact form body; every field is optional until validated
#[derive(Debug, Default, Deserialize)]
pub struct ContactRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Submission that passed validation, fields trimmed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidContact {
    pub name: String,
    pub email: String,
    pub message: String,
}

fn required(field: &Option<String>) -> Option<String> {
    field
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

impl ContactRequest {
    pub fn validate(&self) -> Result<ValidContact> {
        let (Some(name), Some(email), Some(message)) = (
            required(&self.name),
            required(&self.email),
            required(&self.message),
        ) else {
            return Err(MediasiteError::BadRequest(MISSING_FIELDS.to_string()));
        };

        if !EMAIL_PATTERN.is_match(&email) {
            return Err(MediasiteError::BadRequest(INVALID_EMAIL.to_string()));
        }

        Ok(ValidContact {
            name,
            email,
            message,
        })
    }
}

#[derive(Debug, Serialize)]
struct SuccessResponse {
    success: bool,
    message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<serde_json::Value>,
}

/// POST /api/contact
pub async fn handle_submit_contact(state: &AppState, body: &[u8]) -> Response<FullBody> {
    let request: ContactRequest = match serde_json::from_slice(body) {
        Ok(r) => r,
        Err(e) => {
            debug!("Rejecting contact body: {}", e);
            return error_response(StatusCode::BAD_REQUEST, "Invalid JSON");
        }
    };

    let contact = match request.validate() {
        Ok(c) => c,
        Err(MediasiteError::BadRequest(message)) => {
            return error_response(StatusCode::BAD_REQUEST, &message)
        }
        Err(e) => return error_response(StatusCode::BAD_REQUEST, &e.to_string()),
    };

    let result = async {
        let document = bson::to_document(&MessageDoc::new(
            contact.name,
            contact.email,
            contact.message,
        ))?;
        let store = state.store.acquire().await?;
        store.insert_one(MESSAGE_COLLECTION, document).await
    }
    .await;

    match result {
        Ok(id) => {
            info!("Contact message stored ({})", id);
            json_response(
                StatusCode::CREATED,
                &SuccessResponse {
                    success: true,
                    message: "Message sent successfully",
                    id: Some(bson_to_json(id)),
                },
            )
        }
        Err(e) => store_failure(StatusCode::INTERNAL_SERVER_ERROR, "Failed to send message", &e),
    }
}

/// GET /api/messages
pub async fn handle_list_messages(state: &AppState) -> Response<FullBody> {
    let result = async {
        let store = state.store.acquire().await?;
        store
            .find(MESSAGE_COLLECTION, doc! {}, Some(MessageDoc::sort()))
            .await
    }
    .await;

    match result {
        Ok(documents) => json_response(StatusCode::OK, &documents_to_json(documents)),
        Err(e) => store_failure(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to fetch messages",
            &e,
        ),
    }
}

/// GET /api/messages/{id}
pub async fn handle_get_message(state: &AppState, raw_id: &str) -> Response<FullBody> {
    let id = DocumentId::resolve(raw_id);

    match find_by_id(state, MESSAGE_COLLECTION, &id).await {
        Ok(Some(document)) => json_response(StatusCode::OK, &document_to_json(document)),
        Ok(None) => error_response(StatusCode::NOT_FOUND, "Message not found"),
        Err(e) => store_failure(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to fetch message",
            &e,
        ),
    }
}

/// PATCH /api/messages/{id}/read
///
/// Answers 200 whenever a document matched, including one already read.
pub async fn handle_mark_read(state: &AppState, raw_id: &str) -> Response<FullBody> {
    let id = DocumentId::resolve(raw_id);

    let result = async {
        let store = state.store.acquire().await?;
        store
            .update_one(
                MESSAGE_COLLECTION,
                id.filter(),
                MessageDoc::mark_read_update(DateTime::now()),
            )
            .await
    }
    .await;

    match result {
        Ok(outcome) if outcome.matched > 0 => {
            info!("Message {} marked read", id);
            json_response(
                StatusCode::OK,
                &SuccessResponse {
                    success: true,
                    message: "Message marked as read",
                    id: None,
                },
            )
        }
        Ok(_) => error_response(StatusCode::NOT_FOUND, "Message not found"),
        Err(e) => store_failure(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to update message",
            &e,
        ),
    }
}
