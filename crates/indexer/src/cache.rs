use crate::indexer::extension_of;
use crate::language::Language;
use crate::record::{FileIndex, FileRecord};
use crate::symbols::{Symbol, SymbolKind};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

const CACHE_DIR: &str = ".localai/cache";
const CACHE_FILE_NAME: &str = "index.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CachedFile {
    hash: String,
    mtime: u64,
    size: u64,
    #[serde(default)]
    language: String,
    #[serde(default)]
    line_count: usize,
    #[serde(default)]
    symbols: Vec<CachedSymbol>,
    #[serde(default)]
    imports: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CachedSymbol {
    kind: SymbolKind,
    name: String,
    line: usize,
}

pub fn index_cache_path(root: &Path) -> PathBuf {
    root.join(CACHE_DIR).join(CACHE_FILE_NAME)
}

/// Persist `index` under `root`. Failures are logged and swallowed.
pub fn save_index_cache(root: &Path, index: &FileIndex) {
    if let Err(e) = try_save(root, index) {
        log::warn!("Failed to write index cache: {e}");
    }
}

fn try_save(root: &Path, index: &FileIndex) -> Result<()> {
    let path = index_cache_path(root);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let entries: BTreeMap<&str, CachedFile> = index
        .iter()
        .map(|(rel, record)| (rel.as_str(), to_cached(record)))
        .collect();

    let bytes = serde_json::to_vec_pretty(&entries)?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, bytes)?;
    std::fs::rename(&tmp, &path)?;
    log::debug!("Wrote index cache with {} entries", entries.len());
    Ok(())
}

/// Read the persisted index. Missing or unreadable caches yield an empty index.
pub fn load_index_cache(root: &Path) -> FileIndex {
    let path = index_cache_path(root);
    if !path.is_file() {
        return FileIndex::new();
    }
    match try_load(root, &path) {
        Ok(index) => index,
        Err(e) => {
            log::warn!("Ignoring unreadable index cache {}: {e}", path.display());
            FileIndex::new()
        }
    }
}

fn try_load(root: &Path, path: &Path) -> Result<FileIndex> {
    let bytes = std::fs::read(path)?;
    let entries: BTreeMap<String, CachedFile> = serde_json::from_slice(&bytes)?;
    Ok(entries
        .into_iter()
        .map(|(rel, cached)| {
            let record = from_cached(root, &rel, cached);
            (rel, record)
        })
        .collect())
}

fn to_cached(record: &FileRecord) -> CachedFile {
    CachedFile {
        hash: record.content_hash.clone(),
        mtime: record.last_modified,
        size: record.size,
        language: record.language_name().to_string(),
        line_count: record.line_count,
        symbols: record
            .symbols
            .iter()
            .map(|s| CachedSymbol {
                kind: s.kind,
                name: s.name.clone(),
                line: s.line,
            })
            .collect(),
        imports: record.imports.clone(),
    }
}

fn from_cached(root: &Path, rel: &str, cached: CachedFile) -> FileRecord {
    let abs_path = root.join(rel);
    let language = if cached.language.is_empty() {
        None
    } else {
        serde_json::from_value::<Language>(serde_json::Value::String(cached.language)).ok()
    };
    FileRecord {
        extension: extension_of(&abs_path),
        abs_path,
        rel_path: rel.to_string(),
        size: cached.size,
        content_hash: cached.hash,
        last_modified: cached.mtime,
        line_count: cached.line_count,
        language,
        symbols: cached
            .symbols
            .into_iter()
            .map(|s| Symbol {
                kind: s.kind,
                name: s.name,
                line: s.line,
                end_line: 0,
            })
            .collect(),
        imports: cached.imports,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ignore::IgnoreRules;
    use crate::indexer::Indexer;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn round_trips_through_disk() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("main.go"), "package main\n\nimport \"fmt\"\n\nfunc main() {}\n")
            .unwrap();
        let index = Indexer::new(temp.path(), IgnoreRules::new(), 1_000_000).scan();

        save_index_cache(temp.path(), &index);
        assert!(index_cache_path(temp.path()).is_file());
        assert_eq!(load_index_cache(temp.path()), index);
    }

    #[test]
    fn writes_documented_layout() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("a.py"), "def run():\n    pass\n").unwrap();
        let index = Indexer::new(temp.path(), IgnoreRules::new(), 1_000_000).scan();
        save_index_cache(temp.path(), &index);

        let raw: serde_json::Value =
            serde_json::from_slice(&fs::read(index_cache_path(temp.path())).unwrap()).unwrap();
        let entry = &raw["a.py"];
        assert_eq!(entry["language"], "python");
        assert_eq!(entry["line_count"], 3);
        assert_eq!(entry["symbols"][0]["kind"], "function");
        assert_eq!(entry["symbols"][0]["name"], "run");
        assert_eq!(entry["symbols"][0]["line"], 1);
        assert!(entry["hash"].as_str().is_some_and(|h| h.len() == 64));
    }

    #[test]
    fn corrupt_cache_reads_as_empty() {
        let temp = tempdir().unwrap();
        let path = index_cache_path(temp.path());
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{not json").unwrap();
        assert!(load_index_cache(temp.path()).is_empty());
    }
}
