//! An opened project folder: configuration, index, and the queries the
//! context layer runs against it.

use crate::cache::{load_index_cache, save_index_cache};
use crate::config::{
    config_path, load_workspace_config, load_workspace_rules, rules_path, WorkspaceConfig,
    STATE_DIR,
};
use crate::ignore::IgnoreRules;
use crate::indexer::Indexer;
use crate::notify::PathChangeListener;
use crate::project::detect_project_types;
use crate::record::{FileIndex, FileRecord};
use crate::scanner::relative_path;
use crate::stats::WorkspaceStats;
use crate::{IndexerError, Result};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::time::Instant;

const TREE_MAX_DEPTH: usize = 3;
const TREE_COLLAPSE_AFTER: usize = 8;
const TREE_COLLAPSED_SHOWN: usize = 4;
const TOP_LANGUAGES: usize = 8;
const MAX_SYMBOL_HITS: usize = 100;
const MIN_STEM_MATCH_LEN: usize = 3;

/// How [`Workspace::open`] obtained its index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OpenMode {
    /// No usable cache; every file was hashed and parsed
    FullScan,
    /// The persisted cache seeded an incremental rescan
    CacheSeeded,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OpenReport {
    pub mode: OpenMode,
    pub files: usize,
    pub changed: usize,
    pub removed: usize,
    pub elapsed_ms: u64,
}

pub struct Workspace {
    root: PathBuf,
    config: WorkspaceConfig,
    rules: String,
    indexer: Indexer,
    project_types: Vec<String>,
    index: FileIndex,
    stats: WorkspaceStats,
    contents: HashMap<String, String>,
}

impl Workspace {
    /// Load configuration, rules, and ignore sources for `root`. Nothing is
    /// scanned until [`Workspace::open`].
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let requested = root.as_ref();
        let root = requested.canonicalize().map_err(|e| {
            IndexerError::InvalidPath(format!("{}: {e}", requested.display()))
        })?;
        if !root.is_dir() {
            return Err(IndexerError::InvalidPath(format!(
                "{} is not a directory",
                root.display()
            )));
        }

        let config = load_workspace_config(&root);
        let rules = load_workspace_rules(&root);
        let ignore = IgnoreRules::load(&root);
        let indexer = Indexer::new(&root, ignore, config.max_file_size);

        Ok(Self {
            root,
            config,
            rules,
            indexer,
            project_types: Vec::new(),
            index: FileIndex::new(),
            stats: WorkspaceStats::new(),
            contents: HashMap::new(),
        })
    }

    /// Re-hash metadata-equal files during refreshes.
    pub fn with_content_verification(mut self, verify: bool) -> Self {
        self.indexer = self.indexer.with_content_verification(verify);
        self
    }

    /// Detect project types and build the index, seeded from the persisted
    /// cache when one exists.
    pub fn open(&mut self) -> OpenReport {
        let started = Instant::now();
        self.project_types = detect_project_types(&self.root);
        self.contents.clear();

        let cached = load_index_cache(&self.root);
        let (mode, changed, removed) = if cached.is_empty() {
            self.index = self.indexer.scan();
            (OpenMode::FullScan, self.index.len(), 0)
        } else {
            let delta = self.indexer.rescan_changed(&cached);
            let counts = (delta.changed.len(), delta.removed.len());
            self.index = delta.index;
            (OpenMode::CacheSeeded, counts.0, counts.1)
        };

        let elapsed_ms = elapsed_ms(started);
        self.recompute_stats(elapsed_ms);
        save_index_cache(&self.root, &self.index);

        log::info!(
            "Opened {} ({:?}): {} files, {} changed, {} removed",
            self.root.display(),
            mode,
            self.index.len(),
            changed,
            removed
        );

        OpenReport {
            mode,
            files: self.index.len(),
            changed,
            removed,
            elapsed_ms,
        }
    }

    /// Incremental rescan of the whole tree. Returns `(changed, removed)`.
    pub fn refresh(&mut self) -> (Vec<String>, Vec<String>) {
        let started = Instant::now();
        let delta = self.indexer.rescan_changed(&self.index);
        self.index = delta.index;
        self.recompute_stats(elapsed_ms(started));

        for rel in delta.changed.iter().chain(delta.removed.iter()) {
            self.contents.remove(rel);
        }
        if !delta.changed.is_empty() || !delta.removed.is_empty() {
            save_index_cache(&self.root, &self.index);
        }
        (delta.changed, delta.removed)
    }

    /// Re-index one file or directory after an external modification.
    ///
    /// Returns the workspace-relative keys whose content may have changed,
    /// resolved the same way the index keys are, so callers can invalidate
    /// their own per-path state with them. Empty for paths outside the root.
    pub fn notify_path_changed(&mut self, abs_path: &Path) -> Vec<String> {
        let Some(rel) = self.relative_to_root(abs_path) else {
            log::debug!("Ignoring change outside workspace: {}", abs_path.display());
            return Vec::new();
        };

        let outcome = self.indexer.refresh_path(&mut self.index, &rel);
        log::debug!("Refreshed {rel}: {outcome:?}");
        let stale = outcome.stale_paths(&rel);
        for path in &stale {
            self.contents.remove(path);
        }
        if outcome.touched_index() {
            let scan_ms = self.stats.scan_ms;
            self.recompute_stats(scan_ms);
            save_index_cache(&self.root, &self.index);
        }
        stale
    }

    fn relative_to_root(&self, path: &Path) -> Option<String> {
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        };
        if let Some(rel) = relative_path(&self.root, &absolute) {
            return Some(rel);
        }
        // Deleted files cannot be canonicalized, so resolve through the parent.
        let parent = absolute.parent()?.canonicalize().ok()?;
        let resolved = parent.join(absolute.file_name()?);
        relative_path(&self.root, &resolved)
    }

    fn recompute_stats(&mut self, scan_ms: u64) {
        self.stats = WorkspaceStats::from_index(&self.index);
        self.stats.scan_ms = scan_ms;
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &WorkspaceConfig {
        &self.config
    }

    pub fn rules(&self) -> &str {
        &self.rules
    }

    pub fn project_types(&self) -> &[String] {
        &self.project_types
    }

    pub fn index(&self) -> &FileIndex {
        &self.index
    }

    pub fn stats(&self) -> &WorkspaceStats {
        &self.stats
    }

    pub fn record(&self, rel_path: &str) -> Option<&FileRecord> {
        self.index.get(rel_path)
    }

    /// Compact overview for context injection: header, language mix, and a
    /// collapsed directory tree, at most `max_lines` lines.
    pub fn get_structure_summary(&self, max_lines: usize) -> String {
        let name = self
            .root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.root.display().to_string());

        let mut lines = vec![format!("Project: {name}")];
        if !self.project_types.is_empty() {
            lines.push(format!("Type: {}", self.project_types.join(", ")));
        }
        lines.push(format!(
            "Files: {}  |  Lines: {}",
            self.stats.files,
            group_thousands(self.stats.total_lines)
        ));
        let languages = self.stats.top_languages(TOP_LANGUAGES);
        if !languages.is_empty() {
            let listed: Vec<String> = languages
                .iter()
                .map(|(lang, count)| format!("{lang} ({count})"))
                .collect();
            lines.push(format!("Languages: {}", listed.join(", ")));
        }
        lines.push(String::new());
        lines.push("Structure:".to_string());

        let budget = max_lines.saturating_sub(lines.len());
        lines.extend(self.build_tree(budget));
        lines.truncate(max_lines);
        lines.join("\n")
    }

    fn build_tree(&self, max_lines: usize) -> Vec<String> {
        let mut dirs: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for rel in self.index.keys() {
            let parts: Vec<&str> = rel.split('/').collect();
            let depth = (parts.len() - 1).min(TREE_MAX_DEPTH);
            let dir = if depth == 0 {
                ".".to_string()
            } else {
                parts[..depth].join("/")
            };
            dirs.entry(dir).or_default().push(parts[depth..].join("/"));
        }

        let mut lines = Vec::new();
        for (dir, files) in &dirs {
            if lines.len() >= max_lines {
                lines.push("  ... (truncated)".to_string());
                break;
            }
            let prefix = if dir == "." {
                ""
            } else {
                lines.push(format!("  {dir}/"));
                "    "
            };

            if files.len() <= TREE_COLLAPSE_AFTER {
                lines.extend(files.iter().map(|f| format!("{prefix}{f}")));
            } else {
                lines.extend(
                    files
                        .iter()
                        .take(TREE_COLLAPSED_SHOWN)
                        .map(|f| format!("{prefix}{f}")),
                );
                lines.push(format!(
                    "{prefix}... +{} more files",
                    files.len() - TREE_COLLAPSED_SHOWN
                ));
            }

            if lines.len() >= max_lines {
                lines.push("  ... (truncated)".to_string());
                break;
            }
        }
        lines
    }

    /// File text (lossily decoded), memoized until invalidated.
    pub fn get_file_content(&mut self, rel_path: &str) -> Option<&str> {
        if !self.contents.contains_key(rel_path) {
            let record = self.index.get(rel_path)?;
            let bytes = match std::fs::read(&record.abs_path) {
                Ok(bytes) => bytes,
                Err(e) => {
                    log::debug!("Failed to read {rel_path}: {e}");
                    return None;
                }
            };
            self.contents.insert(
                rel_path.to_string(),
                String::from_utf8_lossy(&bytes).into_owned(),
            );
        }
        self.contents.get(rel_path).map(String::as_str)
    }

    pub fn invalidate_cache(&mut self, rel_path: &str) {
        self.contents.remove(rel_path);
    }

    /// Files connected to `rel_path`: import targets first, then similar
    /// names, then siblings. At most `max_context_files` entries.
    pub fn find_related_files(&self, rel_path: &str) -> Vec<String> {
        let Some(record) = self.index.get(rel_path) else {
            return Vec::new();
        };

        let mut related: Vec<String> = Vec::new();
        let mut add = |candidate: &str| {
            if candidate != rel_path && !related.iter().any(|r| r == candidate) {
                related.push(candidate.to_string());
            }
        };

        for import in &record.imports {
            let needle = import.replace('.', "/").replace('@', "");
            let needle = needle.trim();
            if needle.is_empty() {
                continue;
            }
            for candidate in self.index.keys() {
                if strip_extension(candidate).ends_with(needle) || candidate.contains(needle) {
                    add(candidate);
                }
            }
        }

        let stem = file_stem(rel_path);
        if stem.chars().count() >= MIN_STEM_MATCH_LEN {
            for candidate in self.index.keys() {
                let other = file_stem(candidate);
                if other.contains(stem) || stem.contains(other) {
                    add(candidate);
                }
            }
        }

        let dir = parent_dir(rel_path);
        for candidate in self.index.keys() {
            if parent_dir(candidate) == dir {
                add(candidate);
            }
        }

        related.truncate(self.config.max_context_files);
        related
    }

    /// Case-insensitive substring search over symbol names. Each hit is
    /// `(rel_path, "kind:name:line")`.
    pub fn search_symbols(&self, query: &str) -> Vec<(String, String)> {
        let query = query.to_lowercase();
        let query = query.as_str();
        self.index
            .iter()
            .flat_map(move |(rel, record)| {
                record
                    .symbols
                    .iter()
                    .filter(move |sym| sym.name.to_lowercase().contains(query))
                    .map(move |sym| (rel.clone(), format!("{}:{}:{}", sym.kind, sym.name, sym.line)))
            })
            .take(MAX_SYMBOL_HITS)
            .collect()
    }
}

impl PathChangeListener for Workspace {
    fn path_changed(&mut self, abs_path: &Path) {
        self.notify_path_changed(abs_path);
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

fn parent_dir(rel_path: &str) -> &str {
    rel_path.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
}

fn file_name(rel_path: &str) -> &str {
    rel_path.rsplit_once('/').map(|(_, name)| name).unwrap_or(rel_path)
}

/// Base name without its last extension. Dotfiles keep their name.
pub fn file_stem(rel_path: &str) -> &str {
    let name = file_name(rel_path);
    match name.rfind('.') {
        Some(idx) if idx > 0 => &name[..idx],
        _ => name,
    }
}

fn strip_extension(rel_path: &str) -> &str {
    let stem_len = file_stem(rel_path).len();
    let name_len = file_name(rel_path).len();
    &rel_path[..rel_path.len() - (name_len - stem_len)]
}

/// `1234567` -> `1,234,567`
fn group_thousands(value: usize) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

const DEFAULT_RULES: &str = "# Workspace Rules\n\n\
Add custom instructions here that the AI should follow when working in this project.\n\n\
Examples:\n\
- Always use TypeScript strict mode\n\
- Follow PEP 8 for Python code\n\
- Use 2-space indentation\n\
- Prefer functional components in React\n";

const DEFAULT_IGNORE: &str = "# Additional ignore patterns for the AI workspace\n\
# Uses .gitignore syntax\n\
# Directories end with /\n\n\
# Example:\n\
# *.log\n\
# tmp/\n";

/// Create `.localai/` with default config, rules, and ignore files. Existing
/// files are left alone.
pub fn init_workspace(root: &Path) -> Result<()> {
    let state_dir = root.join(STATE_DIR);
    std::fs::create_dir_all(state_dir.join("cache"))?;

    let config = config_path(root);
    if !config.exists() {
        let body = serde_json::to_string_pretty(&WorkspaceConfig::default())?;
        std::fs::write(&config, body)?;
    }
    let rules = rules_path(root);
    if !rules.exists() {
        std::fs::write(&rules, DEFAULT_RULES)?;
    }
    let ignore = state_dir.join("ignore");
    if !ignore.exists() {
        std::fs::write(&ignore, DEFAULT_IGNORE)?;
    }
    Ok(())
}
