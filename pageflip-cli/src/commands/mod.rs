//! CLI command implementations

mod create;
mod list;
mod show;

pub use create::create;
pub use list::list;
pub use show::show;

use crate::LibraryArgs;
use anyhow::{Context, Result};
use pageflip_core::{BookService, OwnerId, SqliteBookStore};
use std::path::PathBuf;
use std::sync::Arc;

impl LibraryArgs {
    pub fn owner(&self) -> OwnerId {
        OwnerId::new(self.user.trim())
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join("pageflip.db")
    }

    pub fn objects_dir(&self) -> PathBuf {
        self.data_dir.join("objects")
    }

    /// Open the book record service over the data directory's database
    pub fn service(&self) -> Result<BookService> {
        let path = self.database_path();
        let store = SqliteBookStore::open(&path)
            .with_context(|| format!("Failed to open database {}", path.display()))?;
        Ok(BookService::new(Arc::new(store)))
    }
}
