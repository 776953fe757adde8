use crate::record::FileIndex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Language bucket for files without a detected language
pub const OTHER_LANGUAGE: &str = "other";

/// Aggregate figures over a [`FileIndex`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceStats {
    /// Number of indexed files
    pub files: usize,

    /// Total lines across text files
    pub total_lines: usize,

    /// File count per language
    pub languages: BTreeMap<String, usize>,

    /// Duration of the last full or incremental scan
    pub scan_ms: u64,
}

impl WorkspaceStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_index(index: &FileIndex) -> Self {
        let mut stats = Self::new();
        for record in index.values() {
            let language = match record.language_name() {
                "" => OTHER_LANGUAGE,
                name => name,
            };
            stats.add_file(language, record.line_count);
        }
        stats
    }

    pub fn add_file(&mut self, language: &str, lines: usize) {
        self.files += 1;
        self.total_lines += lines;
        *self.languages.entry(language.to_string()).or_insert(0) += 1;
    }

    /// Languages by file count descending, then name; at most `limit`.
    pub fn top_languages(&self, limit: usize) -> Vec<(&str, usize)> {
        let mut ranked: Vec<(&str, usize)> = self
            .languages
            .iter()
            .map(|(name, count)| (name.as_str(), *count))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked.truncate(limit);
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::WorkspaceStats;
    use pretty_assertions::assert_eq;

    #[test]
    fn ranks_languages_by_count_then_name() {
        let mut stats = WorkspaceStats::new();
        stats.add_file("rust", 10);
        stats.add_file("python", 5);
        stats.add_file("rust", 1);
        stats.add_file("go", 2);

        assert_eq!(stats.files, 4);
        assert_eq!(stats.total_lines, 18);
        assert_eq!(stats.top_languages(2), vec![("rust", 2), ("go", 1)]);
    }
}
