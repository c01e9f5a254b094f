//! Keeps the file store and the metadata record consistent across
//! upload, list, flag update and delete.

use std::sync::Arc;

use thiserror::Error;
use tokio::io::AsyncRead;

use crate::config::StorageConfig;
use crate::file_store::{self, FileStore, FileStoreError, LocalFileStore};
use crate::metadata::{self, MetadataError, MetadataStore};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error(transparent)]
    Files(#[from] FileStoreError),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error(transparent)]
    Metadata(#[from] MetadataError),
}

/// A listed file with its effective rendered flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub name: String,
    pub rendered: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    /// Name the file was stored under.
    pub name: String,
    /// Client-supplied name after transport decoding.
    pub original_name: String,
    pub size: u64,
}

pub struct Catalog {
    files: Arc<dyn FileStore>,
    metadata: MetadataStore,
}

impl Catalog {
    pub fn new(files: Arc<dyn FileStore>, metadata: MetadataStore) -> Self {
        Self { files, metadata }
    }

    /// Open a local file store and its metadata record as configured.
    ///
    /// A relative metadata path is placed inside the data directory. Whenever
    /// the record ends up directly in the data directory, absolute or not, it
    /// is hidden from listings and protected from upload and delete.
    pub fn open(config: &StorageConfig) -> Result<Self, std::io::Error> {
        let mut files = LocalFileStore::new(&config.data_dir)?;
        let metadata_path = files.root().join(&config.metadata_file);

        let co_located = metadata_path
            .parent()
            .and_then(|parent| parent.canonicalize().ok())
            .is_some_and(|parent| parent == files.root());
        if let (true, Some(name)) = (co_located, metadata_path.file_name()) {
            files = files.with_reserved_name(name.to_string_lossy());
        }

        Ok(Self::new(Arc::new(files), MetadataStore::new(metadata_path)))
    }

    pub fn metadata(&self) -> &MetadataStore {
        &self.metadata
    }

    pub async fn list(&self) -> Result<Vec<FileEntry>, CatalogError> {
        let names = self.files.list().await?;
        let table = self.metadata.load_all().await;

        Ok(names
            .into_iter()
            .map(|name| {
                let rendered = table.flag(&name);
                FileEntry { name, rendered }
            })
            .collect())
    }

    /// Store an upload and seed its flag to rendered.
    ///
    /// `raw_name` is the name as delivered by the transport. If the flag cannot
    /// be seeded the file is removed again.
    pub async fn upload(
        &self,
        raw_name: Option<&str>,
        data: &mut (dyn AsyncRead + Send + Unpin),
    ) -> Result<UploadedFile, CatalogError> {
        let raw_name = raw_name
            .filter(|n| !n.is_empty())
            .ok_or_else(|| CatalogError::InvalidInput("uploaded file has no name".into()))?;
        let original_name = file_store::decode_upload_name(raw_name);

        let stored = self.files.create(&original_name, data).await?;

        if let Err(e) = self.metadata.set_flag(&stored.name, true).await {
            if let Err(cleanup) = self.files.remove(&stored.name).await {
                tracing::warn!(file = %stored.name, error = %cleanup, "Failed to remove file after metadata error");
            }
            return Err(e.into());
        }

        tracing::debug!(file = %stored.name, size = stored.size, "Uploaded file");
        Ok(UploadedFile {
            name: stored.name,
            original_name,
            size: stored.size,
        })
    }

    /// Set the rendered flag for `name`. The file does not have to exist yet.
    pub async fn set_rendered(
        &self,
        name: &str,
        value: &serde_json::Value,
    ) -> Result<bool, CatalogError> {
        file_store::validate_name(name)?;
        let rendered = metadata::parse_flag(value)?;
        self.metadata.set_flag(name, rendered).await?;
        Ok(rendered)
    }

    /// Remove the file, then its metadata entry.
    ///
    /// Metadata is only touched once the file is gone. A leftover entry is
    /// harmless, so failing to drop it does not fail the delete.
    pub async fn delete(&self, name: &str) -> Result<(), CatalogError> {
        self.files.remove(name).await?;

        if let Err(e) = self.metadata.delete_entry(name).await {
            tracing::warn!(file = %name, error = %e, "File deleted but metadata entry was kept");
        }

        tracing::debug!(file = %name, "Deleted file");
        Ok(())
    }
}
