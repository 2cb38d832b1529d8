//! Server configuration from environment variables

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Header the upstream identity proxy sets when none is configured
pub const DEFAULT_IDENTITY_HEADER: &str = "x-user-id";

/// Runtime settings for the HTTP server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on (`PAGEFLIP_BIND`)
    pub bind: SocketAddr,

    /// Directory holding the database and uploaded objects (`PAGEFLIP_DATA_DIR`)
    pub data_dir: PathBuf,

    /// Externally visible base URL of this server (`PAGEFLIP_PUBLIC_URL`)
    pub public_url: String,

    /// Comma-separated allowed origins, or `*` (`PAGEFLIP_CORS_ORIGINS`)
    pub cors_origins: Option<String>,

    /// Request header carrying the caller's user id (`PAGEFLIP_IDENTITY_HEADER`)
    pub identity_header: String,
}

impl ServerConfig {
    /// Read configuration from the environment, falling back to local defaults
    pub fn from_env() -> Result<Self> {
        let bind: SocketAddr = std::env::var("PAGEFLIP_BIND")
            .unwrap_or_else(|_| "127.0.0.1:3000".to_string())
            .parse()
            .context("PAGEFLIP_BIND is not a valid socket address")?;

        let data_dir = std::env::var("PAGEFLIP_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./pageflip_data"));

        let public_url = std::env::var("PAGEFLIP_PUBLIC_URL")
            .unwrap_or_else(|_| format!("http://{bind}"))
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            bind,
            data_dir,
            public_url,
            cors_origins: std::env::var("PAGEFLIP_CORS_ORIGINS").ok(),
            identity_header: std::env::var("PAGEFLIP_IDENTITY_HEADER")
                .unwrap_or_else(|_| DEFAULT_IDENTITY_HEADER.to_string()),
        })
    }

    /// SQLite file holding the books table
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join("pageflip.db")
    }

    /// Root of the local object store
    pub fn objects_dir(&self) -> PathBuf {
        self.data_dir.join("objects")
    }

    /// Base URL uploaded objects are served from
    pub fn files_url(&self) -> String {
        format!("{}/files", self.public_url)
    }
}
