mod store;
mod table;

pub use store::MetadataStore;
pub use table::{parse_flag, MetadataTable, DEFAULT_RENDERED};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("Corrupt metadata record: {0}")]
    Corrupt(#[source] serde_json::Error),
    #[error("Invalid rendered flag: {0}")]
    InvalidFlag(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[source] serde_json::Error),
}
