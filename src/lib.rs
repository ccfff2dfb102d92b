//! Mediasite - HTTP facade over a MongoDB document store
//!
//! Serves the site's podcast and video catalogues and accepts contact
//! messages from visitors.
//!
//! ## Services
//!
//! - **Content**: read-only listing and lookup of podcasts and videos
//! - **Contact**: message submission, listing and mark-read
//! - **Diagnostics**: health, version and collection debug summaries
//!
//! Every request maps to a single store query through the lazily connected
//! [`db::StoreHandle`].

pub mod config;
pub mod db;
pub mod routes;
pub mod server;
pub mod types;

pub use config::Args;
pub use server::{dispatch, run, AppState};
pub use types::{MediasiteError, Result};
