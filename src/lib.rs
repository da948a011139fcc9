pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod storage;
pub mod ui;

pub use db::DbPool;

use anyhow::Result;
use config::Config;
use std::sync::Arc;

use crate::auth::TokenService;
use crate::storage::{BlobStore, LocalBlobStore};

pub struct AppState {
    pub config: Config,
    pub db: DbPool,
    pub tokens: TokenService,
    pub blobs: Arc<dyn BlobStore>,
}

impl AppState {
    /// Fails when no signing secret is configured
    pub fn new(config: Config, db: DbPool) -> Result<Self> {
        let tokens = TokenService::new(config.auth.jwt_secret()?);
        let blobs: Arc<dyn BlobStore> = Arc::new(LocalBlobStore::new(&config.server.upload_dir));
        Ok(Self {
            config,
            db,
            tokens,
            blobs,
        })
    }

    /// Swap the upload backend
    pub fn with_blob_store(mut self, blobs: Arc<dyn BlobStore>) -> Self {
        self.blobs = blobs;
        self
    }
}
