//! Error types for Pageflip Core

use thiserror::Error;

/// Result type alias using PageflipError
pub type Result<T> = std::result::Result<T, PageflipError>;

/// Top-level error type for all Pageflip operations
#[derive(Debug, Error)]
pub enum PageflipError {
    #[error("Authentication required")]
    Authentication,

    #[error("Validation error: {0}")]
    Validation(String),

    /// Covers both "absent" and "owned by someone else"
    #[error("Book not found")]
    NotFound,

    #[error("Upload error: {0}")]
    Upload(#[from] UploadError),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Wizard error: {0}")]
    Wizard(#[from] WizardError),
}

impl PageflipError {
    /// The wizard misuse behind this error, if that is what it is
    pub fn as_wizard(&self) -> Option<&WizardError> {
        match self {
            PageflipError::Wizard(e) => Some(e),
            _ => None,
        }
    }
}

/// Errors raised by the upload pipeline
#[derive(Debug, Error)]
#[error("Failed to upload page {page} to {key}: {source}")]
pub struct UploadError {
    /// 1-based page number that failed
    pub page: usize,

    /// Storage key the page was being written to
    pub key: String,

    #[source]
    pub source: StorageError,
}

/// Errors raised when a wizard step is used out of order
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WizardError {
    #[error("No book is being created")]
    NoDraft,

    #[error("Draft has no images")]
    NoImages,

    #[error("An upload is already in progress")]
    UploadInProgress,

    #[error("Images have not been uploaded yet")]
    NotUploaded,

    #[error("Image index {index} out of range (draft has {len} images)")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Errors that occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Backend error: {0}")]
    BackendError(String),
}
