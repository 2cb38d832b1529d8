//! The persisted Book record and its creation request

use super::Category;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier of an authenticated user, issued by the identity provider
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A stored book: ordered page images plus descriptive fields
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Auto-increment row id
    pub id: i64,

    pub title: String,

    pub description: String,

    pub category: Category,

    /// Page image URLs, in page order
    pub images: Vec<String>,

    /// Owner of the record; the only caller allowed to see it
    pub user_id: OwnerId,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Book {
    /// Number of pages in the book
    pub fn page_count(&self) -> usize {
        self.images.len()
    }
}

/// Client-supplied fields for creating a book
///
/// Everything is optional on the wire; the record service rejects a missing
/// title and fills in the remaining defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewBook {
    pub title: Option<String>,

    pub description: Option<String>,

    /// Category as free text; parsed against [`Category`] during validation
    pub category: Option<String>,

    pub images: Option<Vec<String>>,
}

impl NewBook {
    /// Create a request with just a title
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    /// Set the ordered page URLs
    pub fn with_images(mut self, images: Vec<String>) -> Self {
        self.images = Some(images);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_book_json_uses_camel_case() {
        let now = Utc::now();
        let book = Book {
            id: 7,
            title: "Trip".to_string(),
            description: String::new(),
            category: Category::General,
            images: vec!["u1".to_string()],
            user_id: OwnerId::new("user_1"),
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_value(&book).unwrap();
        assert_eq!(json["userId"], "user_1");
        assert_eq!(json["category"], "general");
        assert!(json.get("createdAt").is_some());
        assert!(json.get("updatedAt").is_some());
    }

    #[test]
    fn test_new_book_accepts_partial_body() {
        let new_book: NewBook = serde_json::from_str(r#"{"title":"Trip"}"#).unwrap();
        assert_eq!(new_book, NewBook::titled("Trip"));
    }
}
