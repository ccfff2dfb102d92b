//! Error types for Mediasite

/// Main error type for Mediasite operations
#[derive(Debug, thiserror::Error)]
pub enum MediasiteError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<std::io::Error> for MediasiteError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<mongodb::error::Error> for MediasiteError {
    fn from(err: mongodb::error::Error) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<bson::ser::Error> for MediasiteError {
    fn from(err: bson::ser::Error) -> Self {
        Self::Internal(format!("BSON encode error: {}", err))
    }
}

/// Result type alias for Mediasite operations
pub type Result<T> = std::result::Result<T, MediasiteError>;
