//! Podcast and video collections
//!
//! Documents are written by the ingestion job, not by this service, so no
//! schema is imposed beyond the `date` field used for ordering.

use bson::{doc, Document};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Podcast,
    Video,
}

impl ContentKind {
    pub const ALL: [ContentKind; 2] = [ContentKind::Podcast, ContentKind::Video];

    pub fn collection(&self) -> &'static str {
        match self {
            Self::Podcast => "podcasts",
            Self::Video => "videos",
        }
    }

    /// Singular label used in log lines and error messages
    pub fn label(&self) -> &'static str {
        match self {
            Self::Podcast => "Podcast",
            Self::Video => "Video",
        }
    }

    /// Newest first
    pub fn sort() -> Document {
        doc! { "date": -1 }
    }
}
