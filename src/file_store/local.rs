use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncRead, AsyncWriteExt};

use super::name::validate_name;
use super::{FileStore, FileStoreError, StoredFile};

/// Local filesystem file store. Every file lives directly under `root`.
pub struct LocalFileStore {
    root: PathBuf,
    reserved: Vec<String>,
}

impl LocalFileStore {
    /// Open the store, creating the root directory if it does not exist.
    pub fn new<P: AsRef<Path>>(root: P) -> Result<Self, std::io::Error> {
        std::fs::create_dir_all(root.as_ref())?;
        let root = root.as_ref().canonicalize()?;
        Ok(Self {
            root,
            reserved: Vec::new(),
        })
    }

    /// Hide `name` (and its `<name>.*.tmp` siblings) from listings and refuse
    /// to create files under it. Used for a co-located metadata record.
    pub fn with_reserved_name(mut self, name: impl Into<String>) -> Self {
        self.reserved.push(name.into());
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn is_reserved(&self, name: &str) -> bool {
        self.reserved.iter().any(|reserved| {
            name == reserved
                || name
                    .strip_prefix(reserved.as_str())
                    .is_some_and(|rest| rest.starts_with('.') && rest.ends_with(".tmp"))
        })
    }

    /// Resolve `name` to a path that is guaranteed to sit directly under the root.
    ///
    /// The entry must exist. A symlink is only accepted if its target resolves
    /// under the root; dangling links are rejected since their target cannot
    /// be checked and writing through them would create it.
    fn contained_path(&self, name: &str) -> Result<PathBuf, FileStoreError> {
        validate_name(name)?;
        let candidate = self.root.join(name);

        let metadata = std::fs::symlink_metadata(&candidate).map_err(|e| match e.kind() {
            ErrorKind::NotFound => FileStoreError::NotFound(name.to_string()),
            _ => FileStoreError::Io(e),
        })?;
        if !metadata.file_type().is_symlink() {
            return Ok(candidate);
        }

        let resolved = candidate.canonicalize().map_err(|e| match e.kind() {
            ErrorKind::NotFound => FileStoreError::InvalidPath(name.to_string()),
            _ => FileStoreError::Io(e),
        })?;

        if resolved == self.root || !resolved.starts_with(&self.root) {
            return Err(FileStoreError::InvalidPath(name.to_string()));
        }

        Ok(candidate)
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn create(
        &self,
        name: &str,
        data: &mut (dyn AsyncRead + Send + Unpin),
    ) -> Result<StoredFile, FileStoreError> {
        validate_name(name)?;
        if self.is_reserved(name) {
            return Err(FileStoreError::InvalidPath(name.to_string()));
        }

        // Overwriting is fine, but never through a link that leaves the root.
        let path = match self.contained_path(name) {
            Ok(path) => path,
            Err(FileStoreError::NotFound(_)) => self.root.join(name),
            Err(e) => return Err(e),
        };

        let mut file = tokio::fs::File::create(&path).await?;
        let size = tokio::io::copy(data, &mut file).await?;
        file.flush().await?;

        Ok(StoredFile {
            name: name.to_string(),
            size,
        })
    }

    async fn list(&self) -> Result<Vec<String>, FileStoreError> {
        let mut entries = tokio::fs::read_dir(&self.root).await?;
        let mut names = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            match entry.file_name().into_string() {
                Ok(name) if self.is_reserved(&name) => {}
                Ok(name) => names.push(name),
                Err(raw) => {
                    tracing::warn!(name = ?raw, "Skipping entry with non UTF-8 name");
                }
            }
        }

        Ok(names)
    }

    async fn remove(&self, name: &str) -> Result<(), FileStoreError> {
        if self.is_reserved(name) {
            return Err(FileStoreError::InvalidPath(name.to_string()));
        }
        let path = self.contained_path(name)?;
        tokio::fs::remove_file(&path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => FileStoreError::NotFound(name.to_string()),
            _ => FileStoreError::Io(e),
        })
    }
}
