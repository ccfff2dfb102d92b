//! Shared types for Mediasite

mod error;

pub use error::{MediasiteError, Result};
