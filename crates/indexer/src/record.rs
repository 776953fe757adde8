use crate::language::Language;
use crate::symbols::Symbol;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Path-keyed index of a workspace. Keys are `/`-separated relative paths.
pub type FileIndex = BTreeMap<String, FileRecord>;

/// Indexed metadata and extracted facts for one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub abs_path: PathBuf,
    pub rel_path: String,
    /// Lower-cased, with leading dot; empty when the file has none
    pub extension: String,
    pub size: u64,
    /// Hex SHA-256 of the raw bytes
    pub content_hash: String,
    /// Nanoseconds since the UNIX epoch
    pub last_modified: u64,
    pub line_count: usize,
    pub language: Option<Language>,
    pub symbols: Vec<Symbol>,
    pub imports: Vec<String>,
}

impl FileRecord {
    /// The `(mtime, size)` pair used as the change-detection proxy.
    pub fn fingerprint(&self) -> (u64, u64) {
        (self.last_modified, self.size)
    }

    pub fn language_name(&self) -> &'static str {
        self.language.map(Language::as_str).unwrap_or("")
    }
}

/// Result of an incremental rescan
#[derive(Debug, Clone, Default)]
pub struct ScanDelta {
    pub index: FileIndex,
    /// New paths and paths whose content hash changed
    pub changed: Vec<String>,
    /// Previously indexed paths missing from the new index
    pub removed: Vec<String>,
}

impl ScanDelta {
    pub fn is_noop(&self) -> bool {
        self.changed.is_empty() && self.removed.is_empty()
    }
}
