//! Additive relevance heuristic for ranking indexed files against a task.

use context_indexer::{file_stem, FileRecord, Language};

/// Files scoring below this are never offered as context.
pub const INCLUSION_THRESHOLD: f64 = 2.0;

const BASENAME_WEIGHT: f64 = 5.0;
const PATH_WEIGHT: f64 = 6.0;
const SYMBOL_WEIGHT: f64 = 3.0;
const SAME_DIR_WEIGHT: f64 = 1.0;
const ACTIVE_NAME_WEIGHT: f64 = 2.0;
const LANGUAGE_HINT_WEIGHT: f64 = 1.5;
const SMALL_FILE_BONUS: f64 = 0.3;
const LARGE_FILE_PENALTY: f64 = 0.3;
const ENTRY_POINT_BONUS: f64 = 0.5;

const SMALL_FILE_LINES: usize = 200;
const LARGE_FILE_LINES: usize = 1000;
const MIN_SYMBOL_LEN: usize = 3;

const ENTRY_POINT_STEMS: &[&str] = &["main", "index", "config", "settings", "routes", "urls", "schema"];

fn language_hints(language: Language) -> &'static [&'static str] {
    match language {
        Language::Python => &[".py", "pip", "pytest", "django", "flask", "fastapi"],
        Language::JavaScript => &[".js", "npm", "node", "react", "express", "webpack"],
        Language::TypeScript => &[".ts", ".tsx", "tsc", "angular", "next"],
        Language::Rust => &[".rs", "cargo", "crate"],
        Language::Go => &[".go", "go mod", "goroutine"],
        _ => &[],
    }
}

fn parent_dir(rel_path: &str) -> &str {
    rel_path.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
}

fn base_name(rel_path: &str) -> &str {
    rel_path.rsplit_once('/').map(|(_, name)| name).unwrap_or(rel_path)
}

/// Score `record` at `rel_path` for `instruction`. Higher is more relevant.
pub fn score_file(
    rel_path: &str,
    record: &FileRecord,
    instruction: &str,
    active_file: Option<&str>,
) -> f64 {
    let instruction = instruction.to_lowercase();
    let basename = base_name(rel_path).to_lowercase();
    let stem = file_stem(&basename);
    let mut score = 0.0;

    if instruction.contains(basename.as_str()) || instruction.contains(stem) {
        score += BASENAME_WEIGHT;
    }
    if instruction.contains(rel_path.to_lowercase().as_str()) {
        score += PATH_WEIGHT;
    }

    if record.symbols.iter().any(|sym| {
        sym.name.chars().count() >= MIN_SYMBOL_LEN
            && instruction.contains(sym.name.to_lowercase().as_str())
    }) {
        score += SYMBOL_WEIGHT;
    }

    if let Some(active) = active_file {
        if parent_dir(active) == parent_dir(rel_path) {
            score += SAME_DIR_WEIGHT;
        }
        let active_stem = file_stem(base_name(active));
        if basename.contains(active_stem) || active_stem.contains(stem) {
            score += ACTIVE_NAME_WEIGHT;
        }
    }

    if let Some(language) = record.language {
        if language_hints(language).iter().any(|hint| instruction.contains(hint)) {
            score += LANGUAGE_HINT_WEIGHT;
        }
    }

    if record.line_count < SMALL_FILE_LINES {
        score += SMALL_FILE_BONUS;
    } else if record.line_count > LARGE_FILE_LINES {
        score -= LARGE_FILE_PENALTY;
    }

    if ENTRY_POINT_STEMS.contains(&stem) {
        score += ENTRY_POINT_BONUS;
    }

    score
}
