//! Pageflip Core Library
//!
//! This crate provides the types and workflow for assembling picture books:
//! a wizard that stages and orders page images, a pipeline that uploads them
//! to object storage, and a record service that stores the finished book for
//! its owner.

pub mod db;
pub mod error;
pub mod reorder;
pub mod service;
pub mod staging;
pub mod storage;
pub mod types;
pub mod upload;
pub mod viewer;
pub mod wizard;

pub use db::{BookRecord, BookRepository, SqliteBookStore};
pub use error::{PageflipError, Result, StorageError, UploadError, WizardError};
pub use service::BookService;
pub use staging::{PreviewHandle, PreviewRegistry, SelectedFile, StagedImage};
pub use types::{Book, Category, NewBook, OwnerId};
pub use upload::{UploadPipeline, UploadProgress};
pub use viewer::PageCursor;
pub use wizard::{BookDetails, DraftUpdate, Step, WizardDraft, WizardSession};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_book_request() {
        let request = NewBook::titled("Test Book").with_images(vec!["u1".into()]);
        assert_eq!(request.title.as_deref(), Some("Test Book"));
        assert_eq!(request.images, Some(vec!["u1".to_string()]));
    }
}
