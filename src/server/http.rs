//! HTTP server implementation
//!
//! Uses hyper http1 with TokioIo for async handling. Each accepted
//! connection runs on its own task; requests share one [`AppState`].

use bytes::Bytes;
use http_body_util::{BodyExt, LengthLimitError, Limited};
use hyper::body::{Body, Incoming};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::config::Args;
use crate::db::schemas::ContentKind;
use crate::db::{MemoryConnector, MemoryStore, MongoConnector, StoreConnector, StoreHandle};
use crate::routes::{self, FullBody};
use crate::types::MediasiteError;

/// Largest request body accepted; contact submissions are small JSON objects
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// Shared application state
pub struct AppState {
    pub args: Args,
    /// Lazily connected document store
    pub store: StoreHandle,
}

impl AppState {
    pub fn new(args: Args, connector: Arc<dyn StoreConnector>) -> Self {
        Self {
            args,
            store: StoreHandle::new(connector),
        }
    }

    /// MongoDB-backed state, or an empty in-memory store in dev mode
    pub fn from_args(args: Args) -> Self {
        let connector: Arc<dyn StoreConnector> = if args.dev_mode {
            Arc::new(MemoryConnector::new(Arc::new(MemoryStore::new())))
        } else {
            Arc::new(MongoConnector::new(
                args.mongodb_uri.clone(),
                args.mongodb_db.clone(),
            ))
        };
        Self::new(args, connector)
    }
}

/// Start the HTTP server
pub async fn run(state: Arc<AppState>) -> Result<(), MediasiteError> {
    let listener = TcpListener::bind(state.args.listen).await?;

    info!("Mediasite listening on {}", state.args.listen);

    if state.args.dev_mode {
        warn!("Development mode enabled - using in-memory store");
    }

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    let io = TokioIo::new(stream);

                    let service = service_fn(move |req| {
                        let state = Arc::clone(&state);
                        async move { handle_request(state, addr, req).await }
                    });

                    if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                        error!("Error serving connection from {}: {:?}", addr, err);
                    }
                });
            }
            Err(e) => {
                error!("Error accepting connection: {:?}", e);
            }
        }
    }
}

/// Hand the request to [`dispatch`], reading the body only for POST
async fn handle_request(
    state: Arc<AppState>,
    addr: SocketAddr,
    req: Request<Incoming>,
) -> Result<Response<FullBody>, hyper::Error> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    info!("[{}] {} {}", addr, method, path);

    let body = if method == Method::POST {
        match read_body(req.into_body(), MAX_BODY_BYTES).await {
            Ok(body) => body,
            Err(resp) => {
                warn!("Rejected request body from {} ({})", addr, resp.status());
                return Ok(resp);
            }
        }
    } else {
        Bytes::new()
    };

    Ok(dispatch(&state, method, &path, body).await)
}

/// Collect at most `limit` bytes; larger bodies answer 413
async fn read_body<B>(body: B, limit: usize) -> Result<Bytes, Response<FullBody>>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    match Limited::new(body, limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => Err(routes::error_response(
            StatusCode::PAYLOAD_TOO_LARGE,
            "Request body too large",
        )),
        Err(_) => Err(routes::error_response(StatusCode::BAD_REQUEST, "Invalid body")),
    }
}

/// Route a request to its handler.
///
/// Path identifiers are percent-decoded before lookup.
pub async fn dispatch(state: &AppState, method: Method, path: &str, body: Bytes) -> Response<FullBody> {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    match (method, segments.as_slice()) {
        // CORS preflight
        (Method::OPTIONS, _) => routes::preflight_response(),

        (Method::GET, ["health"]) | (Method::GET, ["api", "health"]) => routes::health_check(state),
        (Method::GET, ["version"]) => routes::version_info(),

        // ====================================================================
        // Content
        // ====================================================================
        (Method::GET, ["api", "podcasts"]) => {
            routes::handle_list_content(state, ContentKind::Podcast).await
        }
        (Method::GET, ["api", "podcasts", id]) => match decode_segment(id) {
            Ok(id) => routes::handle_get_content(state, ContentKind::Podcast, &id).await,
            Err(resp) => resp,
        },
        (Method::GET, ["api", "videos"]) => routes::handle_list_content(state, ContentKind::Video).await,
        (Method::GET, ["api", "videos", id]) => match decode_segment(id) {
            Ok(id) => routes::handle_get_content(state, ContentKind::Video, &id).await,
            Err(resp) => resp,
        },

        // ====================================================================
        // Contact messages
        // ====================================================================
        (Method::POST, ["api", "contact"]) => routes::handle_submit_contact(state, &body).await,
        (Method::GET, ["api", "messages"]) => routes::handle_list_messages(state).await,
        (Method::GET, ["api", "messages", id]) => match decode_segment(id) {
            Ok(id) => routes::handle_get_message(state, &id).await,
            Err(resp) => resp,
        },
        (Method::PATCH | Method::PUT, ["api", "messages", id, "read"]) => match decode_segment(id) {
            Ok(id) => routes::handle_mark_read(state, &id).await,
            Err(resp) => resp,
        },

        (Method::GET, ["api", "debug"]) => routes::handle_debug(state).await,

        _ => routes::not_found_response(path),
    }
}

fn decode_segment(segment: &str) -> Result<String, Response<FullBody>> {
    urlencoding::decode(segment)
        .map(|decoded| decoded.into_owned())
        .map_err(|_| routes::error_response(StatusCode::BAD_REQUEST, "Invalid identifier encoding"))
}
