use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::MetadataError;

/// Flag value for files that have no entry in the table.
pub const DEFAULT_RENDERED: bool = true;

/// File name -> rendered flag, persisted as a single JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetadataTable(BTreeMap<String, bool>);

impl MetadataTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The rendered flag for `name`, falling back to [`DEFAULT_RENDERED`].
    pub fn flag(&self, name: &str) -> bool {
        self.0.get(name).copied().unwrap_or(DEFAULT_RENDERED)
    }

    /// The stored flag for `name`, if any. Unlike [`flag`](Self::flag) this
    /// distinguishes "never set" from "set to true".
    pub fn get(&self, name: &str) -> Option<bool> {
        self.0.get(name).copied()
    }

    pub fn set(&mut self, name: impl Into<String>, rendered: bool) {
        self.0.insert(name.into(), rendered);
    }

    pub fn remove(&mut self, name: &str) -> bool {
        self.0.remove(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Accept only a JSON boolean. `"true"`, `1` and `null` are rejected, not coerced.
pub fn parse_flag(value: &serde_json::Value) -> Result<bool, MetadataError> {
    value
        .as_bool()
        .ok_or_else(|| MetadataError::InvalidFlag(format!("expected a boolean, got {value}")))
}
