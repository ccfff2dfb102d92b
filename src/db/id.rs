//! Path identifier resolution
//!
//! A path segment is tried as an `ObjectId` first. Anything that does not
//! parse is matched verbatim against string `_id`s, so records inserted
//! with non-native keys stay reachable.

use bson::{doc, oid::ObjectId, Document};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentId {
    Native(ObjectId),
    Key(String),
}

impl DocumentId {
    pub fn resolve(raw: &str) -> Self {
        match ObjectId::parse_str(raw) {
            Ok(oid) => Self::Native(oid),
            Err(_) => Self::Key(raw.to_string()),
        }
    }

    /// `_id` equality filter
    pub fn filter(&self) -> Document {
        match self {
            Self::Native(oid) => doc! { "_id": *oid },
            Self::Key(key) => doc! { "_id": key.as_str() },
        }
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Native(oid) => write!(f, "{}", oid.to_hex()),
            Self::Key(key) => f.write_str(key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_object_id() {
        let oid = ObjectId::new();
        let id = DocumentId::resolve(&oid.to_hex());
        assert_eq!(id, DocumentId::Native(oid));
        assert_eq!(id.filter(), doc! { "_id": oid });
    }

    #[test]
    fn test_resolve_falls_back_to_key() {
        let id = DocumentId::resolve("episode-42");
        assert_eq!(id, DocumentId::Key("episode-42".to_string()));
        assert_eq!(id.filter(), doc! { "_id": "episode-42" });
    }

    #[test]
    fn test_near_miss_hex_is_a_key() {
        // one char short; right length with a non-hex char
        assert!(matches!(
            DocumentId::resolve("65a1b2c3d4e5f6a7b8c9d0e"),
            DocumentId::Key(_)
        ));
        assert!(matches!(
            DocumentId::resolve("65a1b2c3d4e5f6a7b8c9d0ez"),
            DocumentId::Key(_)
        ));
    }

    #[test]
    fn test_display() {
        assert_eq!(DocumentId::resolve("abc").to_string(), "abc");
        let hex = "65a1b2c3d4e5f6a7b8c9d0e1";
        assert_eq!(DocumentId::resolve(hex).to_string(), hex);
    }
}
