//! Configuration for Mediasite
//!
//! CLI arguments and environment variable handling using clap.

use clap::Parser;
use std::net::SocketAddr;

/// Mediasite - podcast, video and contact API
#[derive(Parser, Debug, Clone)]
#[command(name = "mediasite")]
#[command(about = "HTTP facade over MongoDB for podcasts, videos and contact messages")]
pub struct Args {
    /// Address to listen on
    #[arg(long, env = "LISTEN", default_value = "0.0.0.0:5000")]
    pub listen: SocketAddr,

    /// MongoDB connection URI
    #[arg(long, env = "MONGODB_URI", default_value = "mongodb://localhost:27017")]
    pub mongodb_uri: String,

    /// MongoDB database name
    #[arg(long, env = "MONGODB_DB", default_value = "mediasite")]
    pub mongodb_db: String,

    /// Enable development mode (in-memory store, MongoDB is never contacted)
    #[arg(long, env = "DEV_MODE", default_value = "false")]
    pub dev_mode: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Args {
    /// MongoDB URI with any `user:password@` credentials masked, for logging
    pub fn redacted_uri(&self) -> String {
        let uri = &self.mongodb_uri;
        let Some(scheme_end) = uri.find("://") else {
            return uri.clone();
        };
        let rest = &uri[scheme_end + 3..];
        let authority_end = rest.find('/').unwrap_or(rest.len());
        match rest[..authority_end].rfind('@') {
            Some(at) => format!("{}://***@{}", &uri[..scheme_end], &rest[at + 1..]),
            None => uri.clone(),
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.mongodb_db.trim().is_empty() {
            return Err("MONGODB_DB must not be empty".to_string());
        }

        if !self.dev_mode
            && !self.mongodb_uri.starts_with("mongodb://")
            && !self.mongodb_uri.starts_with("mongodb+srv://")
        {
            return Err(
                "MONGODB_URI must start with mongodb:// or mongodb+srv://".to_string(),
            );
        }

        Ok(())
    }
}
