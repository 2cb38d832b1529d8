//! Staged page images and their preview handles

use parking_lot::Mutex;
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

/// A file picked by the user, not yet uploaded
#[derive(Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub data: Vec<u8>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    /// Extension of the original file name, if it has one
    pub fn extension(&self) -> Option<&str> {
        Path::new(&self.name).extension().and_then(|e| e.to_str())
    }
}

impl fmt::Debug for SelectedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectedFile")
            .field("name", &self.name)
            .field("bytes", &self.data.len())
            .finish()
    }
}

/// A revocable reference used to display a staged file before upload
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PreviewHandle(Uuid);

impl PreviewHandle {
    /// Display URL for the preview
    pub fn url(&self) -> String {
        format!("preview:{}", self.0)
    }
}

/// Allocates and revokes preview handles
///
/// Handles are never released automatically; whoever allocates one revokes it.
/// Clones share the same set of live handles.
#[derive(Debug, Clone, Default)]
pub struct PreviewRegistry {
    live: Arc<Mutex<HashSet<Uuid>>>,
}

impl PreviewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&self) -> PreviewHandle {
        let id = Uuid::new_v4();
        self.live.lock().insert(id);
        PreviewHandle(id)
    }

    /// Revoke a handle; returns false if it was already revoked
    pub fn revoke(&self, handle: &PreviewHandle) -> bool {
        self.live.lock().remove(&handle.0)
    }

    pub fn is_live(&self, handle: &PreviewHandle) -> bool {
        self.live.lock().contains(&handle.0)
    }

    /// Number of handles allocated and not yet revoked
    pub fn live_count(&self) -> usize {
        self.live.lock().len()
    }
}

/// One page of the book being assembled
///
/// Its position in the draft's image list is its sequence position.
#[derive(Debug, Clone, PartialEq)]
pub struct StagedImage {
    pub file: SelectedFile,
    pub preview: PreviewHandle,
    /// Set once the upload pipeline has stored the file
    pub remote_url: Option<String>,
}

impl StagedImage {
    pub fn new(file: SelectedFile, preview: PreviewHandle) -> Self {
        Self {
            file,
            preview,
            remote_url: None,
        }
    }

    pub fn is_uploaded(&self) -> bool {
        self.remote_url.is_some()
    }
}
