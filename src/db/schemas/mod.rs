//! Database schemas for Mediasite
//!
//! Podcasts and videos are open documents; only messages have a typed shape.

mod content;
mod message;

pub use content::ContentKind;
pub use message::{MessageDoc, MESSAGE_COLLECTION};
