//! Shared test helpers for file-shelf unit tests.

use std::sync::Arc;

use crate::catalog::Catalog;
use crate::config::{Config, HttpConfig, StorageConfig};
use crate::AppState;

/// Create a test AppState with its data and public directories inside `temp_dir`.
pub fn test_state(temp_dir: &tempfile::TempDir) -> Arc<AppState> {
    let public_dir = temp_dir.path().join("public");
    let data_dir = public_dir.join("data");

    let config = Config {
        bind_address: "127.0.0.1:0".to_string(),
        http: HttpConfig {
            public_dir: public_dir.to_string_lossy().to_string(),
            ..Default::default()
        },
        storage: StorageConfig {
            data_dir: data_dir.to_string_lossy().to_string(),
            ..Default::default()
        },
        max_upload_size: 10 * 1024 * 1024, // 10MB for tests
    };

    let catalog = Catalog::open(&config.storage).expect("Failed to open test catalog");

    Arc::new(AppState { catalog, config })
}
