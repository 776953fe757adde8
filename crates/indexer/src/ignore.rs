use globset::{Glob, GlobMatcher};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Ignore sources, most specific first.
const IGNORE_SOURCES: &[&str] = &[".localaiignore", ".localai/ignore", ".gitignore"];

const DEFAULT_SKIP_DIRS: &[&str] = &[
    // VCS / tooling
    ".git",
    ".hg",
    ".svn",
    ".idea",
    ".gradle",
    ".localai",
    // caches / builds
    "node_modules",
    "__pycache__",
    ".next",
    ".nuxt",
    "dist",
    "build",
    ".cache",
    ".tox",
    ".mypy_cache",
    ".pytest_cache",
    "coverage",
    ".turbo",
    ".svelte-kit",
    "target",
    ".eggs",
    ".terraform",
    ".serverless",
    // environments / vendor
    ".venv",
    "venv",
    "env",
    "vendor",
    "bower_components",
];

const BINARY_EXTENSIONS: &[&str] = &[
    // images
    "png", "jpg", "jpeg", "gif", "bmp", "ico", "webp", "svg",
    // media / fonts
    "mp3", "mp4", "wav", "avi", "mov", "woff", "woff2", "ttf", "eot", "otf",
    // archives / binaries
    "zip", "tar", "gz", "bz2", "7z", "rar", "exe", "dll", "so", "dylib", "o", "a",
    "pyc", "pyd", "class", "jar", "war",
    // documents / data
    "pdf", "doc", "docx", "xls", "xlsx", "pptx", "db", "sqlite", "sqlite3", "lock",
    "bin", "dat",
    // disk images / packages
    "iso", "img", "dmg", "msi", "deb", "rpm",
];

/// Merged skip rules: built-in directory names and binary extensions plus
/// user patterns from the workspace ignore files.
#[derive(Debug, Clone)]
pub struct IgnoreRules {
    dir_names: HashSet<String>,
    file_patterns: Vec<FilePattern>,
}

#[derive(Debug, Clone)]
struct FilePattern {
    raw: String,
    matcher: GlobMatcher,
}

impl IgnoreRules {
    /// Built-in defaults only.
    pub fn new() -> Self {
        Self {
            dir_names: DEFAULT_SKIP_DIRS.iter().map(|d| d.to_string()).collect(),
            file_patterns: Vec::new(),
        }
    }

    /// Defaults merged with every ignore source present under `root`.
    pub fn load(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        let mut rules = Self::new();
        for source in IGNORE_SOURCES {
            let path: PathBuf = root.join(source);
            if !path.is_file() {
                continue;
            }
            match std::fs::read(&path) {
                Ok(bytes) => rules.add_source(&String::from_utf8_lossy(&bytes)),
                Err(e) => log::debug!("Ignoring unreadable ignore file {}: {e}", path.display()),
            }
        }
        rules
    }

    /// Parse one ignore file body and merge it in.
    pub fn add_source(&mut self, contents: &str) {
        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if line.ends_with('/') {
                let name = line.trim_matches('/');
                if !name.is_empty() {
                    self.dir_names.insert(name.to_string());
                }
                continue;
            }
            self.add_file_pattern(line);
        }
    }

    pub fn add_file_pattern(&mut self, pattern: &str) {
        match Glob::new(pattern) {
            Ok(glob) => self.file_patterns.push(FilePattern {
                raw: pattern.to_string(),
                matcher: glob.compile_matcher(),
            }),
            Err(e) => log::debug!("Skipping invalid ignore pattern {pattern:?}: {e}"),
        }
    }

    pub fn should_skip_dir(&self, name: &str) -> bool {
        self.dir_names.contains(name)
    }

    pub fn should_skip_file(&self, name: &str) -> bool {
        if is_binary_name(name) {
            return true;
        }
        self.file_patterns
            .iter()
            .any(|pattern| pattern.matcher.is_match(name))
    }

    /// User file patterns in evaluation order.
    pub fn file_patterns(&self) -> impl Iterator<Item = &str> {
        self.file_patterns.iter().map(|p| p.raw.as_str())
    }
}

impl Default for IgnoreRules {
    fn default() -> Self {
        Self::new()
    }
}

fn is_binary_name(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_lowercase();
            BINARY_EXTENSIONS.iter().any(|candidate| *candidate == ext)
        })
        .unwrap_or(false)
}
