//! End-to-end route tests against the in-memory store
//!
//! Requests go through `dispatch`, the same entry point the hyper service
//! uses, so routing, validation, lookup and status mapping are covered
//! without a running MongoDB.

use async_trait::async_trait;
use bson::{doc, oid::ObjectId, DateTime};
use bytes::Bytes;
use clap::Parser;
use http_body_util::BodyExt;
use hyper::{Method, StatusCode};
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use mediasite::db::{DocumentStore, MemoryConnector, MemoryStore, StoreConnector};
use mediasite::{dispatch, AppState, Args, MediasiteError};

fn args() -> Args {
    Args::try_parse_from(["mediasite", "--dev-mode", "--mongodb-db", "testdb"]).unwrap()
}

fn memory_state() -> (AppState, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let state = AppState::new(args(), Arc::new(MemoryConnector::new(Arc::clone(&store))));
    (state, store)
}

async fn call(state: &AppState, method: Method, path: &str, body: &str) -> (StatusCode, Value) {
    let response = dispatch(state, method, path, Bytes::from(body.to_string())).await;
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn get(state: &AppState, path: &str) -> (StatusCode, Value) {
    call(state, Method::GET, path, "").await
}

/// Always fails to connect, counting attempts
#[derive(Default)]
struct FailingConnector {
    attempts: AtomicUsize,
}

#[async_trait]
impl StoreConnector for FailingConnector {
    async fn connect(&self) -> mediasite::Result<Arc<dyn DocumentStore>> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(MediasiteError::Database("connection refused".into()))
    }
}

/// Fails the first attempt, then hands out a memory store
#[derive(Default)]
struct FlakyConnector {
    attempts: AtomicUsize,
}

#[async_trait]
impl StoreConnector for FlakyConnector {
    async fn connect(&self) -> mediasite::Result<Arc<dyn DocumentStore>> {
        if self.attempts.fetch_add(1, Ordering::SeqCst) == 0 {
            return Err(MediasiteError::Database("server selection timeout".into()));
        }
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        Ok(store)
    }
}

/// Slow connector used to widen the window for racing first requests
#[derive(Default)]
struct SlowConnector {
    attempts: AtomicUsize,
}

#[async_trait]
impl StoreConnector for SlowConnector {
    async fn connect(&self) -> mediasite::Result<Arc<dyn DocumentStore>> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(50)).await;
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        Ok(store)
    }
}

#[tokio::test]
async fn test_health_reports_store_state_without_connecting() {
    let (state, _) = memory_state();

    let (status, body) = get(&state, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "disconnected");
    assert!(body["timestamp"].is_string());
    assert!(!state.store.is_connected());

    get(&state, "/api/podcasts").await;

    let (status, body) = get(&state, "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["database"], "connected");
}

#[tokio::test]
async fn test_contact_submission_round_trip() {
    let (state, _) = memory_state();

    let (status, body) = call(
        &state,
        Method::POST,
        "/api/contact",
        r#"{"name":"  Ada Lovelace ","email":"ada@example.com","message":"Loved the last episode"}"#,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Message sent successfully");
    let id = body["id"].as_str().unwrap().to_string();
    assert!(ObjectId::parse_str(&id).is_ok());

    let (status, message) = get(&state, &format!("/api/messages/{}", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(message["_id"], id.as_str());
    assert_eq!(message["name"], "Ada Lovelace");
    assert_eq!(message["email"], "ada@example.com");
    assert_eq!(message["read"], false);
    assert!(message["createdAt"].is_string());
    assert!(message.get("readAt").is_none());

    let (status, listing) = get(&state, "/api/messages").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listing.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_invalid_contact_submissions_insert_nothing() {
    let (state, store) = memory_state();

    let bodies = [
        r#"{"email":"ada@example.com","message":"hi"}"#,
        r#"{"name":"Ada","message":"hi"}"#,
        r#"{"name":"Ada","email":"ada@example.com"}"#,
        r#"{"name":"Ada","email":"ada@example.com","message":"   "}"#,
        r#"{"name":"Ada","email":"not-an-email","message":"hi"}"#,
        r#"{"name":"Ada","#,
        "",
    ];
    for body in bodies {
        let (status, json) = call(&state, Method::POST, "/api/contact", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body: {}", body);
        assert!(json["error"].is_string());
    }

    assert_eq!(store.count_documents("messages", doc! {}).await.unwrap(), 0);
}

#[tokio::test]
async fn test_content_listed_newest_first() {
    let (state, store) = memory_state();

    store
        .insert_one(
            "podcasts",
            doc! { "title": "Older", "date": DateTime::from_millis(1_600_000_000_000) },
        )
        .await
        .unwrap();
    store
        .insert_one(
            "podcasts",
            doc! { "title": "Newer", "date": DateTime::from_millis(1_700_000_000_000) },
        )
        .await
        .unwrap();
    store
        .insert_one("videos", doc! { "title": "Only video", "date": DateTime::now() })
        .await
        .unwrap();

    let (status, body) = get(&state, "/api/podcasts").await;
    assert_eq!(status, StatusCode::OK);
    let titles: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Newer", "Older"]);

    let (status, body) = get(&state, "/api/videos/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_empty_listing_is_an_empty_array() {
    let (state, _) = memory_state();
    let (status, body) = get(&state, "/api/videos").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!([]));
}

#[tokio::test]
async fn test_lookup_by_object_id_and_string_key() {
    let (state, store) = memory_state();

    let native = store
        .insert_one("podcasts", doc! { "title": "Native" })
        .await
        .unwrap();
    let native_hex = native.as_object_id().unwrap().to_hex();
    store
        .insert_one("podcasts", doc! { "_id": "legacy-episode", "title": "Legacy" })
        .await
        .unwrap();
    store
        .insert_one("videos", doc! { "_id": "launch trailer", "title": "Trailer" })
        .await
        .unwrap();

    let (status, body) = get(&state, &format!("/api/podcasts/{}", native_hex)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Native");

    let (status, body) = get(&state, "/api/podcasts/legacy-episode").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Legacy");

    let (status, body) = get(&state, "/api/videos/launch%20trailer").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Trailer");

    let missing = ObjectId::new().to_hex();
    let (status, body) = get(&state, &format!("/api/podcasts/{}", missing)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Podcast not found");

    let (status, body) = get(&state, "/api/videos/no-such-video").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Video not found");
}

#[tokio::test]
async fn test_mark_read_twice() {
    let (state, _) = memory_state();

    let (_, created) = call(
        &state,
        Method::POST,
        "/api/contact",
        r#"{"name":"Grace","email":"grace@example.org","message":"Question about sponsorship"}"#,
    )
    .await;
    let id = created["id"].as_str().unwrap().to_string();
    let path = format!("/api/messages/{}/read", id);

    let (status, body) = call(&state, Method::PATCH, &path, "").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, _) = call(&state, Method::PUT, &path, "").await;
    assert_eq!(status, StatusCode::OK);

    let (_, message) = get(&state, &format!("/api/messages/{}", id)).await;
    assert_eq!(message["read"], true);
    assert!(message["readAt"].is_string());

    let missing = format!("/api/messages/{}/read", ObjectId::new().to_hex());
    let (status, body) = call(&state, Method::PATCH, &missing, "").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Message not found");
}

#[tokio::test]
async fn test_messages_listed_newest_first() {
    let (state, store) = memory_state();

    for (name, millis) in [("first", 1_000), ("third", 3_000), ("second", 2_000)] {
        store
            .insert_one(
                "messages",
                doc! {
                    "name": name,
                    "email": "x@y.z",
                    "message": "m",
                    "createdAt": DateTime::from_millis(millis),
                    "read": false,
                },
            )
            .await
            .unwrap();
    }

    let (status, body) = get(&state, "/api/messages").await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["third", "second", "first"]);
}

#[tokio::test]
async fn test_debug_summary() {
    let (state, store) = memory_state();

    let (status, body) = get(&state, "/api/debug").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["database"], "testdb");
    assert_eq!(body["podcastCount"], 0);
    assert_eq!(body["videoCount"], 0);
    assert!(body["samplePodcast"].is_null());
    assert!(body["sampleVideo"].is_null());

    store
        .insert_one("podcasts", doc! { "_id": "ep-1", "title": "Pilot", "date": DateTime::now() })
        .await
        .unwrap();

    let (_, body) = get(&state, "/api/debug").await;
    assert_eq!(body["podcastCount"], 1);
    assert_eq!(body["samplePodcast"]["id"], "ep-1");
    assert_eq!(
        body["samplePodcast"]["fields"],
        serde_json::json!(["_id", "title", "date"])
    );
    assert!(body["sampleVideo"].is_null());
}

#[tokio::test]
async fn test_unreachable_store_status_mapping() {
    let connector = Arc::new(FailingConnector::default());
    let state = AppState::new(args(), connector.clone());
    let oid = ObjectId::new().to_hex();

    let cases = [
        (Method::GET, "/api/podcasts".to_string(), StatusCode::SERVICE_UNAVAILABLE),
        (Method::GET, "/api/videos".to_string(), StatusCode::SERVICE_UNAVAILABLE),
        (Method::GET, "/api/debug".to_string(), StatusCode::SERVICE_UNAVAILABLE),
        (Method::GET, format!("/api/podcasts/{}", oid), StatusCode::INTERNAL_SERVER_ERROR),
        (Method::GET, "/api/videos/some-key".to_string(), StatusCode::INTERNAL_SERVER_ERROR),
        (Method::GET, "/api/messages".to_string(), StatusCode::INTERNAL_SERVER_ERROR),
        (Method::GET, format!("/api/messages/{}", oid), StatusCode::INTERNAL_SERVER_ERROR),
        (Method::PATCH, format!("/api/messages/{}/read", oid), StatusCode::INTERNAL_SERVER_ERROR),
    ];
    for (method, path, expected) in cases.iter().cloned() {
        let (status, body) = call(&state, method, &path, "").await;
        assert_eq!(status, expected, "{}", path);
        assert!(body["error"].is_string());
    }

    let (status, _) = call(
        &state,
        Method::POST,
        "/api/contact",
        r#"{"name":"Ada","email":"ada@example.com","message":"hi"}"#,
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    // Validation runs before any connection attempt
    let before = connector.attempts.load(Ordering::SeqCst);
    let (status, _) = call(
        &state,
        Method::POST,
        "/api/contact",
        r#"{"name":"Ada","email":"nope","message":"hi"}"#,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(connector.attempts.load(Ordering::SeqCst), before);

    // Every failed request retried the connect from scratch
    assert_eq!(before, cases.len() + 1);

    let (status, body) = get(&state, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["database"], "disconnected");
}

#[tokio::test]
async fn test_failed_connect_is_retried_by_next_request() {
    let connector = Arc::new(FlakyConnector::default());
    let state = AppState::new(args(), connector.clone());

    let (status, _) = get(&state, "/api/podcasts").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(!state.store.is_connected());

    let (status, _) = get(&state, "/api/podcasts").await;
    assert_eq!(status, StatusCode::OK);
    assert!(state.store.is_connected());

    get(&state, "/api/videos").await;
    assert_eq!(connector.attempts.load(Ordering::SeqCst), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_first_requests_connect_once() {
    let connector = Arc::new(SlowConnector::default());
    let state = Arc::new(AppState::new(args(), connector.clone()));

    let tasks: Vec<_> = (0..16)
        .map(|i| {
            let state = Arc::clone(&state);
            let path = if i % 2 == 0 { "/api/podcasts" } else { "/api/messages" };
            tokio::spawn(async move {
                dispatch(&state, Method::GET, path, Bytes::new()).await.status()
            })
        })
        .collect();

    for task in tasks {
        assert_eq!(task.await.unwrap(), StatusCode::OK);
    }
    assert_eq!(connector.attempts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_unknown_routes_and_preflight() {
    let (state, _) = memory_state();

    let (status, body) = get(&state, "/api/unknown").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["path"], "/api/unknown");

    let (status, _) = call(&state, Method::DELETE, "/api/messages/abc", "").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = call(&state, Method::OPTIONS, "/api/contact", "").await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = get(&state, "/version").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["service"], "mediasite");
}
