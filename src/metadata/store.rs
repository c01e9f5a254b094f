use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::sync::Mutex;

use super::{MetadataError, MetadataTable};

/// Owns the on-disk metadata record.
///
/// The table is read from disk on every call and written back whole after
/// every mutation; nothing is cached between calls. Mutations through one
/// instance are serialized. Separate instances over the same record are not
/// coordinated: the last full write wins.
pub struct MetadataStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl MetadataStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the record without any recovery.
    ///
    /// `Ok(None)` means the record has never been written.
    pub async fn try_load(&self) -> Result<Option<MetadataTable>, MetadataError> {
        let data = match tokio::fs::read(&self.path).await {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(MetadataError::Io(e)),
        };

        let table = serde_json::from_slice(&data).map_err(MetadataError::Corrupt)?;
        Ok(Some(table))
    }

    /// Load the table, treating a missing or unreadable record as empty.
    pub async fn load_all(&self) -> MetadataTable {
        match self.try_load().await {
            Ok(table) => table.unwrap_or_default(),
            Err(MetadataError::Corrupt(e)) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Ignoring corrupt metadata record");
                MetadataTable::default()
            }
            Err(e) => {
                tracing::error!(path = %self.path.display(), error = %e, "Failed to read metadata record");
                MetadataTable::default()
            }
        }
    }

    pub async fn set_flag(&self, name: &str, rendered: bool) -> Result<(), MetadataError> {
        let _guard = self.write_lock.lock().await;
        let mut table = self.load_for_update().await?;
        table.set(name, rendered);
        self.persist(&table).await?;

        tracing::debug!(file = %name, rendered, "Set rendered flag");
        Ok(())
    }

    /// Drop the entry for `name`. Returns whether an entry existed.
    pub async fn delete_entry(&self, name: &str) -> Result<bool, MetadataError> {
        let _guard = self.write_lock.lock().await;
        let mut table = self.load_for_update().await?;
        let existed = table.remove(name);
        self.persist(&table).await?;

        tracing::debug!(file = %name, existed, "Deleted metadata entry");
        Ok(existed)
    }

    /// Replace the record with `table`.
    ///
    /// Written to a sibling temp file first and renamed into place, so readers
    /// never observe a half-written record.
    pub async fn persist(&self, table: &MetadataTable) -> Result<(), MetadataError> {
        let data = serde_json::to_vec_pretty(table).map_err(MetadataError::Serialization)?;
        let tmp_path = self.temp_path();

        if let Err(e) = tokio::fs::write(&tmp_path, &data).await {
            tracing::error!(path = %self.path.display(), error = %e, "Failed to write metadata record");
            return Err(MetadataError::Io(e));
        }
        if let Err(e) = tokio::fs::rename(&tmp_path, &self.path).await {
            tracing::error!(path = %self.path.display(), error = %e, "Failed to replace metadata record");
            if let Err(cleanup) = tokio::fs::remove_file(&tmp_path).await {
                tracing::debug!(path = %tmp_path.display(), error = %cleanup, "Failed to remove metadata temp file");
            }
            return Err(MetadataError::Io(e));
        }

        Ok(())
    }

    /// Like `load_all`, but an unreadable record is an error so it is not
    /// overwritten. A corrupt record is reset.
    async fn load_for_update(&self) -> Result<MetadataTable, MetadataError> {
        match self.try_load().await {
            Ok(table) => Ok(table.unwrap_or_default()),
            Err(MetadataError::Corrupt(e)) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Resetting corrupt metadata record");
                Ok(MetadataTable::default())
            }
            Err(e) => Err(e),
        }
    }

    fn temp_path(&self) -> PathBuf {
        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "metadata".to_string());
        self.path
            .with_file_name(format!("{file_name}.{}.tmp", uuid::Uuid::new_v4()))
    }
}
