mod local;
mod name;

pub use local::LocalFileStore;
pub use name::{decode_upload_name, validate_name};

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tokio::io::AsyncRead;

#[derive(Debug, Error)]
pub enum FileStoreError {
    #[error("Invalid file path: {0}")]
    InvalidPath(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("File not found: {0}")]
    NotFound(String),
}

/// A file as written by [`FileStore::create`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredFile {
    pub name: String,
    pub size: u64,
}

/// Storage for uploaded file bytes, keyed by file name.
/// Names are single path segments; anything else is an `InvalidPath`.
#[async_trait]
pub trait FileStore: Send + Sync {
    async fn create(
        &self,
        name: &str,
        data: &mut (dyn AsyncRead + Send + Unpin),
    ) -> Result<StoredFile, FileStoreError>;
    async fn list(&self) -> Result<Vec<String>, FileStoreError>;
    async fn remove(&self, name: &str) -> Result<(), FileStoreError>;
}
