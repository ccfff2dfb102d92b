//! JSON response builders shared by every route

use bytes::Bytes;
use http_body_util::Full;
use hyper::header::{
    HeaderValue, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE,
};
use hyper::{Response, StatusCode};
use serde::Serialize;
use tracing::warn;

use crate::types::MediasiteError;

pub type FullBody = Full<Bytes>;

fn build(status: StatusCode, body: Bytes) -> Response<FullBody> {
    let mut response = Response::new(Full::new(body));
    *response.status_mut() = status;
    let headers = response.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    response
}

/// Serialize `body` as the JSON response
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<FullBody> {
    match serde_json::to_vec(body) {
        Ok(bytes) => build(status, Bytes::from(bytes)),
        Err(e) => {
            warn!("Response serialization failed: {}", e);
            build(
                StatusCode::INTERNAL_SERVER_ERROR,
                Bytes::from_static(br#"{"error":"Serialization failed"}"#),
            )
        }
    }
}

/// `{"error": message}` with the given status
pub fn error_response(status: StatusCode, message: &str) -> Response<FullBody> {
    json_response(status, &serde_json::json!({ "error": message }))
}

/// Log a store failure and answer with `status`.
///
/// The driver's message stays in the log; clients only see `message`.
pub fn store_failure(status: StatusCode, message: &str, err: &MediasiteError) -> Response<FullBody> {
    warn!("{}: {}", message, err);
    error_response(status, message)
}

pub fn not_found_response(path: &str) -> Response<FullBody> {
    json_response(
        StatusCode::NOT_FOUND,
        &serde_json::json!({ "error": "Not Found", "path": path }),
    )
}

/// CORS preflight response
pub fn preflight_response() -> Response<FullBody> {
    let mut response = build(StatusCode::OK, Bytes::new());
    let headers = response.headers_mut();
    headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static("*"));
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, PUT, PATCH, OPTIONS"),
    );
    response
}
