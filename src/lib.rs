//! file-shelf - A small file upload service with a per-file "rendered" flag
//!
//! This crate keeps a directory of uploaded files consistent with a side-channel
//! metadata record:
//! - Local file store with path-containment checks
//! - JSON metadata record (file name -> rendered flag), read and rewritten per call
//! - REST API with multipart upload support

pub mod api;
pub mod catalog;
pub mod config;
pub mod file_store;
pub mod metadata;
#[cfg(test)]
pub mod testutil;

use catalog::Catalog;
use config::Config;

/// Shared application state
pub struct AppState {
    pub catalog: Catalog,
    pub config: Config,
}
