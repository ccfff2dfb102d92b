//! Podcast and video endpoints
//!
//! - `GET /api/podcasts`, `GET /api/videos` - full listing, newest first
//! - `GET /api/podcasts/{id}`, `GET /api/videos/{id}` - single document
//!
//! Listing failures answer 503; single-document failures answer 500.

use bson::{doc, Document};
use hyper::{Response, StatusCode};
use tracing::debug;

use crate::db::schemas::ContentKind;
use crate::db::{document_to_json, documents_to_json, DocumentId};
use crate::routes::response::{error_response, json_response, store_failure, FullBody};
use crate::server::AppState;
use crate::types::Result;

/// Look up one document in `collection` by a resolved path id
pub(crate) async fn find_by_id(
    state: &AppState,
    collection: &str,
    id: &DocumentId,
) -> Result<Option<Document>> {
    let store = state.store.acquire().await?;
    store.find_one(collection, id.filter()).await
}

/// GET /api/podcasts | /api/videos
pub async fn handle_list_content(state: &AppState, kind: ContentKind) -> Response<FullBody> {
    let result = async {
        let store = state.store.acquire().await?;
        store
            .find(kind.collection(), doc! {}, Some(ContentKind::sort()))
            .await
    }
    .await;

    match result {
        Ok(documents) => {
            debug!("Listing {} {}", documents.len(), kind.collection());
            json_response(StatusCode::OK, &documents_to_json(documents))
        }
        Err(e) => store_failure(
            StatusCode::SERVICE_UNAVAILABLE,
            &format!("Failed to fetch {}", kind.collection()),
            &e,
        ),
    }
}

/// GET /api/podcasts/{id} | /api/videos/{id}
pub async fn handle_get_content(
    state: &AppState,
    kind: ContentKind,
    raw_id: &str,
) -> Response<FullBody> {
    let id = DocumentId::resolve(raw_id);

    match find_by_id(state, kind.collection(), &id).await {
        Ok(Some(document)) => json_response(StatusCode::OK, &document_to_json(document)),
        Ok(None) => {
            debug!("{} {} not found", kind.label(), id);
            error_response(StatusCode::NOT_FOUND, &format!("{} not found", kind.label()))
        }
        Err(e) => store_failure(
            StatusCode::INTERNAL_SERVER_ERROR,
            &format!("Failed to fetch {}", kind.label().to_lowercase()),
            &e,
        ),
    }
}
