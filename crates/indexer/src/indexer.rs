use crate::ignore::IgnoreRules;
use crate::language::Language;
use crate::record::{FileIndex, FileRecord, ScanDelta};
use crate::scanner::{FileScanner, ScannedFile};
use crate::symbols::SymbolRules;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Instant;

const HASH_CHUNK_BYTES: usize = 64 * 1024;
/// A NUL byte within this prefix marks a file as binary.
const BINARY_SNIFF_BYTES: usize = 8 * 1024;

/// Outcome of re-evaluating a single path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathRefresh {
    /// `(mtime, size)` matched; the previous record was kept
    Unchanged,
    /// The record was recomputed; `content_changed` is true for new paths and
    /// hash changes
    Updated { content_changed: bool },
    /// These indexed paths left the index: the path itself, or every file
    /// under it when it was a directory
    Removed(Vec<String>),
    /// The path is a directory and its subtree was rescanned
    Directory {
        changed: Vec<String>,
        removed: Vec<String>,
    },
    /// The path is not indexable and nothing was indexed under it
    Untracked,
}

impl PathRefresh {
    /// Whether the index was modified.
    pub fn touched_index(&self) -> bool {
        match self {
            Self::Updated { .. } | Self::Removed(_) => true,
            Self::Directory { changed, removed } => !changed.is_empty() || !removed.is_empty(),
            Self::Unchanged | Self::Untracked => false,
        }
    }

    /// Relative paths whose content may differ from what was last read.
    pub fn stale_paths(&self, rel_path: &str) -> Vec<String> {
        match self {
            Self::Removed(paths) => paths.clone(),
            Self::Directory { changed, removed } => {
                changed.iter().chain(removed.iter()).cloned().collect()
            }
            Self::Unchanged | Self::Updated { .. } | Self::Untracked => {
                vec![rel_path.to_string()]
            }
        }
    }
}

/// Builds and incrementally maintains a [`FileIndex`]
pub struct Indexer {
    root: PathBuf,
    ignore: IgnoreRules,
    max_file_size: u64,
    rules: SymbolRules,
    verify_content: bool,
}

impl Indexer {
    pub fn new(root: impl AsRef<Path>, ignore: IgnoreRules, max_file_size: u64) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            ignore,
            max_file_size,
            rules: SymbolRules::global().clone(),
            verify_content: false,
        }
    }

    /// Use a custom extraction table instead of the built-in one.
    pub fn with_symbol_rules(mut self, rules: SymbolRules) -> Self {
        self.rules = rules;
        self
    }

    /// Re-hash files whose `(mtime, size)` is unchanged during rescans.
    ///
    /// Catches same-size rewrites inside the filesystem's timestamp
    /// resolution at the cost of reading every file on each rescan.
    pub fn with_content_verification(mut self, verify: bool) -> Self {
        self.verify_content = verify;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn ignore_rules(&self) -> &IgnoreRules {
        &self.ignore
    }

    fn scanner(&self) -> FileScanner<'_> {
        FileScanner::new(&self.root, &self.ignore, self.max_file_size)
    }

    /// Full scan: every candidate is hashed and parsed.
    pub fn scan(&self) -> FileIndex {
        let started = Instant::now();
        let index: FileIndex = self
            .scanner()
            .scan()
            .into_iter()
            .map(|file| (file.rel_path.clone(), self.index_file(&file)))
            .collect();

        log::info!(
            "Indexed {} files under {} in {} ms",
            index.len(),
            self.root.display(),
            started.elapsed().as_millis()
        );
        index
    }

    /// Incremental rescan against a previous index.
    pub fn rescan_changed(&self, old: &FileIndex) -> ScanDelta {
        let started = Instant::now();
        let mut index = FileIndex::new();
        let mut changed = Vec::new();

        for file in self.scanner().scan() {
            let previous = old.get(&file.rel_path);
            let (record, content_changed) = self.reconcile(&file, previous);
            if content_changed {
                changed.push(file.rel_path.clone());
            }
            index.insert(file.rel_path, record);
        }

        let removed: Vec<String> = old
            .keys()
            .filter(|path| !index.contains_key(*path))
            .cloned()
            .collect();

        log::info!(
            "Rescanned {} files in {} ms ({} changed, {} removed)",
            index.len(),
            started.elapsed().as_millis(),
            changed.len(),
            removed.len()
        );

        ScanDelta {
            index,
            changed,
            removed,
        }
    }

    /// Re-evaluate one relative path in place. Directories have their whole
    /// subtree reconciled; vanished paths drop every record under them.
    pub fn refresh_path(&self, index: &mut FileIndex, rel_path: &str) -> PathRefresh {
        let scanner = self.scanner();
        let Some(file) = scanner.scan_one(rel_path) else {
            let is_dir = std::fs::symlink_metadata(self.root.join(rel_path))
                .is_ok_and(|meta| meta.is_dir());
            if is_dir {
                return self.refresh_dir(&scanner, index, rel_path);
            }
            let removed = remove_under(index, rel_path);
            return if removed.is_empty() {
                PathRefresh::Untracked
            } else {
                PathRefresh::Removed(removed)
            };
        };

        let previous = index.get(&file.rel_path);
        if previous.is_some_and(|old| old.fingerprint() == (file.mtime_ns, file.size))
            && !self.verify_content
        {
            return PathRefresh::Unchanged;
        }

        let (record, content_changed) = self.reconcile(&file, previous);
        index.insert(file.rel_path, record);
        PathRefresh::Updated { content_changed }
    }

    fn refresh_dir(
        &self,
        scanner: &FileScanner<'_>,
        index: &mut FileIndex,
        rel_dir: &str,
    ) -> PathRefresh {
        let prefix = format!("{rel_dir}/");
        let mut previous: FileIndex = FileIndex::new();
        index.retain(|path, record| {
            if path.starts_with(&prefix) {
                previous.insert(path.clone(), record.clone());
                false
            } else {
                true
            }
        });

        let mut changed = Vec::new();
        for file in scanner.scan_under(rel_dir) {
            let (record, content_changed) = self.reconcile(&file, previous.get(&file.rel_path));
            previous.remove(&file.rel_path);
            if content_changed {
                changed.push(file.rel_path.clone());
            }
            index.insert(file.rel_path, record);
        }
        PathRefresh::Directory {
            changed,
            removed: previous.into_keys().collect(),
        }
    }

    /// Reuse or recompute the record for `file`. Returns the record and whether
    /// its content counts as changed.
    fn reconcile(&self, file: &ScannedFile, previous: Option<&FileRecord>) -> (FileRecord, bool) {
        match previous {
            Some(old) if old.fingerprint() == (file.mtime_ns, file.size) => {
                if !self.verify_content {
                    return (old.clone(), false);
                }
                if hash_file(&file.abs_path) == old.content_hash {
                    return (old.clone(), false);
                }
                (self.index_file(file), true)
            }
            Some(old) => {
                let record = self.index_file(file);
                let content_changed = record.content_hash != old.content_hash;
                (record, content_changed)
            }
            None => (self.index_file(file), true),
        }
    }

    fn index_file(&self, file: &ScannedFile) -> FileRecord {
        let content_hash = hash_file(&file.abs_path);
        let language = Language::from_path(&file.abs_path);
        let content = read_text(&file.abs_path);

        let (line_count, symbols, imports) = match content.as_deref() {
            Some(text) if !text.is_empty() => (
                text.matches('\n').count() + 1,
                self.rules.extract_symbols(text, language),
                self.rules.extract_imports(text, language),
            ),
            _ => (0, Vec::new(), Vec::new()),
        };

        FileRecord {
            abs_path: file.abs_path.clone(),
            rel_path: file.rel_path.clone(),
            extension: extension_of(&file.abs_path),
            size: file.size,
            content_hash,
            last_modified: file.mtime_ns,
            line_count,
            language,
            symbols,
            imports,
        }
    }
}

/// Drop `rel_path` and every record below it. Returns the removed keys.
fn remove_under(index: &mut FileIndex, rel_path: &str) -> Vec<String> {
    let prefix = format!("{rel_path}/");
    let removed: Vec<String> = index
        .keys()
        .filter(|path| path.as_str() == rel_path || path.starts_with(&prefix))
        .cloned()
        .collect();
    for path in &removed {
        index.remove(path);
    }
    removed
}

/// Lower-cased extension with a leading dot, or empty.
pub(crate) fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext.to_lowercase()))
        .unwrap_or_default()
}

/// Streaming SHA-256 over fixed-size chunks; empty string when unreadable.
pub fn hash_file(path: &Path) -> String {
    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(e) => {
            log::debug!("Failed to open {} for hashing: {e}", path.display());
            return String::new();
        }
    };

    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; HASH_CHUNK_BYTES];
    loop {
        match file.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => hasher.update(&buf[..n]),
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => {
                log::debug!("Failed to hash {}: {e}", path.display());
                return String::new();
            }
        }
    }
    format!("{:x}", hasher.finalize())
}

/// File contents as text, or `None` for binary / unreadable files.
fn read_text(path: &Path) -> Option<String> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            log::debug!("Failed to read {}: {e}", path.display());
            return None;
        }
    };
    let sniff = &bytes[..bytes.len().min(BINARY_SNIFF_BYTES)];
    if sniff.contains(&0) {
        return None;
    }
    Some(String::from_utf8_lossy(&bytes).into_owned())
}
