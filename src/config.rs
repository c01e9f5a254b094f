use std::path::{Component, Path};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_address: String,
    pub http: HttpConfig,
    pub storage: StorageConfig,
    /// Maximum upload size in bytes
    pub max_upload_size: u64,
}

#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Value of `Access-Control-Allow-Origin`; `*` allows any origin.
    pub cors_allow_origin: String,
    /// Directory served as static assets for unmatched GET requests
    pub public_dir: String,
    pub serve_static: bool,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Directory holding the uploaded files
    pub data_dir: String,
    /// Metadata record. Relative paths are resolved inside `data_dir`.
    pub metadata_file: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            cors_allow_origin: "*".to_string(),
            public_dir: "./public".to_string(),
            serve_static: true,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: "./public/data".to_string(),
            metadata_file: "metadata.json".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bind_address = var("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:8080".to_string());

        let http_defaults = HttpConfig::default();
        let http = HttpConfig {
            cors_allow_origin: var("CORS_ALLOW_ORIGIN").unwrap_or(http_defaults.cors_allow_origin),
            public_dir: var("PUBLIC_DIR").unwrap_or(http_defaults.public_dir),
            serve_static: var("SERVE_STATIC")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(http_defaults.serve_static),
        };

        let storage_defaults = StorageConfig::default();
        let storage = StorageConfig {
            data_dir: var("DATA_DIR").unwrap_or(storage_defaults.data_dir),
            metadata_file: var("METADATA_FILE").unwrap_or(storage_defaults.metadata_file),
        };

        let max_upload_size = var("MAX_UPLOAD_SIZE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(50 * 1024 * 1024); // 50MB

        let config = Config {
            bind_address,
            http,
            storage,
            max_upload_size,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_upload_size == 0 {
            return Err(ConfigError::ValidationError(
                "MAX_UPLOAD_SIZE must be greater than 0".to_string(),
            ));
        }

        if self.http.cors_allow_origin.is_empty()
            || !self.http.cors_allow_origin.bytes().all(|b| b.is_ascii_graphic())
        {
            return Err(ConfigError::ValidationError(
                "CORS_ALLOW_ORIGIN must be `*` or a single origin".to_string(),
            ));
        }

        let metadata_file = Path::new(&self.storage.metadata_file);
        if self.storage.metadata_file.is_empty() {
            return Err(ConfigError::ValidationError(
                "METADATA_FILE cannot be empty".to_string(),
            ));
        }
        if metadata_file.is_relative()
            && !matches!(
                metadata_file.components().collect::<Vec<_>>().as_slice(),
                [Component::Normal(_)]
            )
        {
            return Err(ConfigError::ValidationError(
                "METADATA_FILE must be a file name or an absolute path".to_string(),
            ));
        }

        Ok(())
    }
}
