//! Application state

use crate::auth::{IdentityProvider, TrustedHeader};
use crate::config::ServerConfig;
use anyhow::{Context, Result};
use axum::http::HeaderName;
use pageflip_core::storage::LocalStorage;
use pageflip_core::{BookService, SqliteBookStore, UploadPipeline};
use std::path::PathBuf;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Book record service over the books table
    pub books: BookService,

    /// Uploads page images to object storage
    pub pipeline: UploadPipeline,

    /// Resolves the caller of each request
    pub identity: Arc<dyn IdentityProvider>,

    /// Local object store directory served under `/files`, if any
    pub files_dir: Option<PathBuf>,

    /// Allowed CORS origins (comma-separated or `*`)
    pub cors_origins: Option<String>,
}

impl AppState {
    /// Create application state from configuration
    pub async fn new(config: &ServerConfig) -> Result<Self> {
        let objects_dir = config.objects_dir();
        tokio::fs::create_dir_all(&objects_dir)
            .await
            .with_context(|| format!("Failed to create {}", objects_dir.display()))?;

        let store = SqliteBookStore::open(&config.database_path())
            .context("Failed to open book database")?;
        let storage = LocalStorage::new(&objects_dir, config.files_url());
        let header = HeaderName::from_bytes(config.identity_header.to_lowercase().as_bytes())
            .context("PAGEFLIP_IDENTITY_HEADER is not a valid header name")?;

        tracing::info!(
            data_dir = %config.data_dir.display(),
            identity_header = %header,
            "Initialized application state"
        );

        Ok(Self {
            books: BookService::new(Arc::new(store)),
            pipeline: UploadPipeline::new(Arc::new(storage)),
            identity: Arc::new(TrustedHeader::new(header)),
            files_dir: Some(objects_dir),
            cors_origins: config.cors_origins.clone(),
        })
    }
}
