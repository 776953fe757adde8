use std::collections::HashMap;

/// Content hashes already surfaced to the reasoning engine, per relative path.
///
/// Grows with the number of distinct files touched in a session; there is no
/// eviction.
#[derive(Debug, Clone, Default)]
pub struct ContentCache {
    sent: HashMap<String, String>,
}

impl ContentCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when `hash` is the last hash recorded for `rel_path`.
    pub fn is_already_sent(&self, rel_path: &str, hash: &str) -> bool {
        self.sent.get(rel_path).is_some_and(|sent| sent == hash)
    }

    pub fn mark_sent(&mut self, rel_path: &str, hash: &str) {
        self.sent.insert(rel_path.to_string(), hash.to_string());
    }

    pub fn invalidate(&mut self, rel_path: &str) {
        self.sent.remove(rel_path);
    }

    pub fn clear(&mut self) {
        self.sent.clear();
    }

    pub fn len(&self) -> usize {
        self.sent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sent.is_empty()
    }
}
