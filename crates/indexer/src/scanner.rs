use crate::ignore::IgnoreRules;
use std::fs::Metadata;
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;
use walkdir::WalkDir;

/// A file that survived ignore and size filtering, with the metadata used for
/// change detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedFile {
    pub abs_path: PathBuf,
    pub rel_path: String,
    pub size: u64,
    /// Nanoseconds since the UNIX epoch
    pub mtime_ns: u64,
}

/// Depth-first walker that prunes ignored directories before descending
pub struct FileScanner<'a> {
    root: &'a Path,
    ignore: &'a IgnoreRules,
    max_file_size: u64,
}

impl<'a> FileScanner<'a> {
    pub fn new(root: &'a Path, ignore: &'a IgnoreRules, max_file_size: u64) -> Self {
        Self {
            root,
            ignore,
            max_file_size,
        }
    }

    /// Walk the tree. Unreadable entries are logged and skipped.
    pub fn scan(&self) -> Vec<ScannedFile> {
        self.walk(self.root)
    }

    /// Walk only the directory at `rel_dir`, honoring the ignore rules of the
    /// directory itself and its ancestors.
    pub fn scan_under(&self, rel_dir: &str) -> Vec<ScannedFile> {
        if !self.allowed(Path::new(rel_dir), false) {
            return Vec::new();
        }
        self.walk(&self.root.join(rel_dir))
    }

    fn walk(&self, start: &Path) -> Vec<ScannedFile> {
        let ignore = self.ignore;
        let walker = WalkDir::new(start)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                if entry.depth() == 0 || !entry.file_type().is_dir() {
                    return true;
                }
                !entry
                    .file_name()
                    .to_str()
                    .is_some_and(|name| ignore.should_skip_dir(name))
            });

        let mut files = Vec::new();
        for result in walker {
            let entry = match result {
                Ok(entry) => entry,
                Err(e) => {
                    log::warn!("Failed to read entry: {e}");
                    continue;
                }
            };
            if entry.file_type().is_dir() {
                continue;
            }
            let Some(name) = entry.file_name().to_str() else {
                log::debug!("Skipping non UTF-8 file name {}", entry.path().display());
                continue;
            };
            if self.ignore.should_skip_file(name) {
                continue;
            }
            // Links to files are indexed under the link's own path; links to
            // directories are never descended into.
            let meta = if entry.path_is_symlink() {
                std::fs::metadata(entry.path()).map_err(|e| e.to_string())
            } else {
                entry.metadata().map_err(|e| e.to_string())
            };
            let meta = match meta {
                Ok(meta) => meta,
                Err(e) => {
                    log::warn!("Failed to stat {}: {e}", entry.path().display());
                    continue;
                }
            };
            if !meta.is_file() {
                continue;
            }
            if let Some(file) = self.accept(entry.path(), &meta) {
                files.push(file);
            }
        }

        files
    }

    /// Evaluate a single path with the same rules as a full walk.
    ///
    /// Returns `None` when the path is missing, not a regular file (or a link
    /// to one), ignored (by name or by any ancestor directory), or over the
    /// size cap.
    pub fn scan_one(&self, rel_path: &str) -> Option<ScannedFile> {
        let rel = Path::new(rel_path);
        if !self.allowed(rel, true) {
            return None;
        }

        let abs_path = self.root.join(rel);
        let meta = std::fs::metadata(&abs_path).ok()?;
        if !meta.is_file() {
            return None;
        }
        self.accept(&abs_path, &meta)
    }

    /// Apply directory rules to every component of `rel`, and file rules to
    /// the last one when `last_is_file`.
    fn allowed(&self, rel: &Path, last_is_file: bool) -> bool {
        let mut components = rel.components().peekable();
        if components.peek().is_none() {
            return false;
        }
        while let Some(component) = components.next() {
            let Component::Normal(name) = component else {
                return false;
            };
            let Some(name) = name.to_str() else {
                return false;
            };
            let skipped = if last_is_file && components.peek().is_none() {
                self.ignore.should_skip_file(name)
            } else {
                self.ignore.should_skip_dir(name)
            };
            if skipped {
                return false;
            }
        }
        true
    }

    fn accept(&self, path: &Path, meta: &Metadata) -> Option<ScannedFile> {
        if meta.len() > self.max_file_size {
            log::debug!(
                "Skipping large file {} ({} bytes > {})",
                path.display(),
                meta.len(),
                self.max_file_size
            );
            return None;
        }
        Some(ScannedFile {
            abs_path: path.to_path_buf(),
            rel_path: relative_path(self.root, path)?,
            size: meta.len(),
            mtime_ns: mtime_ns(meta),
        })
    }
}

/// `/`-separated path of `path` under `root`.
pub fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    if parts.is_empty() {
        return None;
    }
    Some(parts.join("/"))
}

fn mtime_ns(meta: &Metadata) -> u64 {
    meta.modified()
        .ok()
        .and_then(|modified| modified.duration_since(SystemTime::UNIX_EPOCH).ok())
        .map(|duration| u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}
