//! Upload storage.
//!
//! Handlers hand raw bytes and a filename to a [`BlobStore`] and get back the
//! public path to store on the row. [`LocalBlobStore`] keeps files on disk and
//! they are served back from `/uploads`.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Public URL prefix for stored uploads
pub const PUBLIC_PREFIX: &str = "/uploads";

/// Default upload size cap (5 MiB)
pub const DEFAULT_MAX_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Unsupported file type: {0}")]
    NotAnImage(String),

    #[error("Invalid file name: {0:?}")]
    InvalidName(String),

    #[error("File too large ({size} bytes, max {max})")]
    TooLarge { size: usize, max: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Persist `bytes` and return the public path they are served from
    async fn write(&self, bytes: &[u8], filename: &str) -> Result<String, StorageError>;
}

/// Reduce a client-supplied name to a safe single path component.
///
/// Directory parts are dropped and anything outside `[A-Za-z0-9._-]` becomes `-`.
pub fn sanitize_filename(filename: &str) -> Result<String, StorageError> {
    let base = filename
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or_default();

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '-'
            }
        })
        .collect();

    let trimmed = cleaned.trim_start_matches('.');
    if trimmed.is_empty() {
        return Err(StorageError::InvalidName(filename.to_string()));
    }

    Ok(trimmed.to_string())
}

/// Only image types are accepted, judged by extension
fn ensure_image(name: &str) -> Result<(), StorageError> {
    let mime = mime_guess::from_path(name).first();
    match mime {
        Some(m) if m.type_() == mime_guess::mime::IMAGE => Ok(()),
        Some(m) => Err(StorageError::NotAnImage(m.essence_str().to_string())),
        None => Err(StorageError::NotAnImage(name.to_string())),
    }
}

/// Stores uploads in a directory on the local filesystem
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
    max_bytes: usize,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            max_bytes: DEFAULT_MAX_BYTES,
        }
    }

    pub fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn write(&self, bytes: &[u8], filename: &str) -> Result<String, StorageError> {
        if bytes.len() > self.max_bytes {
            return Err(StorageError::TooLarge {
                size: bytes.len(),
                max: self.max_bytes,
            });
        }

        let name = sanitize_filename(filename)?;
        ensure_image(&name)?;

        tokio::fs::create_dir_all(&self.root).await?;
        tokio::fs::write(self.root.join(&name), bytes).await?;

        tracing::debug!(file = %name, size = bytes.len(), "Stored upload");
        Ok(format!("{}/{}", PUBLIC_PREFIX, name))
    }
}
