//! Health and version endpoints
//!
//! Health is a liveness probe: it always answers 200 and only reports
//! whether a store handle exists. It never triggers a connection attempt.

use hyper::{Response, StatusCode};
use serde::Serialize;

use crate::routes::response::{json_response, FullBody};
use crate::server::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    /// RFC 3339 time of the check
    pub timestamp: String,
    /// `connected` once the lazy store handle exists, else `disconnected`
    pub database: &'static str,
}

/// Handle liveness probe (/health, /api/health)
pub fn health_check(state: &AppState) -> Response<FullBody> {
    let response = HealthResponse {
        status: "ok",
        timestamp: chrono::Utc::now().to_rfc3339(),
        database: if state.store.is_connected() {
            "connected"
        } else {
            "disconnected"
        },
    };

    json_response(StatusCode::OK, &response)
}

#[derive(Debug, Serialize)]
pub struct VersionResponse {
    pub version: &'static str,
    pub service: &'static str,
}

/// Handle version endpoint (/version)
pub fn version_info() -> Response<FullBody> {
    json_response(
        StatusCode::OK,
        &VersionResponse {
            version: env!("CARGO_PKG_VERSION"),
            service: env!("CARGO_PKG_NAME"),
        },
    )
}
