//! Collection summary for checking what the ingestion job has written
//!
//! `GET /api/debug` reports document counts and the shape of one sample
//! document per content collection. Failures answer 503.

use bson::{doc, Document};
use hyper::{Response, StatusCode};
use serde::Serialize;
use serde_json::Value;

use crate::db::bson_to_json;
use crate::db::schemas::ContentKind;
use crate::routes::response::{json_response, store_failure, FullBody};
use crate::server::AppState;
use crate::types::{MediasiteError, Result};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugResponse {
    pub database: String,
    pub podcast_count: u64,
    pub video_count: u64,
    pub sample_podcast: Option<SampleDocument>,
    pub sample_video: Option<SampleDocument>,
}

/// Identifier and attribute names of one stored document
#[derive(Debug, Serialize, PartialEq)]
pub struct SampleDocument {
    pub id: Value,
    pub fields: Vec<String>,
}

impl From<Document> for SampleDocument {
    fn from(document: Document) -> Self {
        Self {
            id: document
                .get("_id")
                .cloned()
                .map(bson_to_json)
                .unwrap_or(Value::Null),
            fields: document.keys().cloned().collect(),
        }
    }
}

async fn summarize(state: &AppState, kind: ContentKind) -> Result<(u64, Option<SampleDocument>)> {
    let store = state.store.acquire().await?;
    let count = store.count_documents(kind.collection(), doc! {}).await?;
    let sample = store.find_one(kind.collection(), doc! {}).await?;
    Ok((count, sample.map(SampleDocument::from)))
}

/// GET /api/debug
pub async fn handle_debug(state: &AppState) -> Response<FullBody> {
    let result = async {
        let podcasts = summarize(state, ContentKind::Podcast).await?;
        let videos = summarize(state, ContentKind::Video).await?;
        Ok::<_, MediasiteError>((podcasts, videos))
    }
    .await;

    match result {
        Ok(((podcast_count, sample_podcast), (video_count, sample_video))) => json_response(
            StatusCode::OK,
            &DebugResponse {
                database: state.args.mongodb_db.clone(),
                podcast_count,
                video_count,
                sample_podcast,
                sample_video,
            },
        ),
        Err(e) => store_failure(
            StatusCode::SERVICE_UNAVAILABLE,
            "Failed to read collection summary",
            &e,
        ),
    }
}
