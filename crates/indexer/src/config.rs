use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// Per-workspace state directory
pub const STATE_DIR: &str = ".localai";
const CONFIG_FILE_NAME: &str = "config.json";
const RULES_FILE_NAME: &str = "rules.md";
/// Rules beyond this many bytes are dropped.
pub const MAX_RULES_BYTES: usize = 8000;

/// User-tunable settings from `.localai/config.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    /// Files larger than this many bytes are not indexed
    pub max_file_size: u64,
    /// Files listed in a task context
    pub max_context_files: usize,
    /// Approximate token budget for a task context
    pub max_context_tokens: usize,
    pub auto_validate: bool,
    pub confirm_large_edits: bool,
    /// Changed lines above which an edit counts as large
    pub large_edit_threshold: usize,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            max_file_size: 1_000_000,
            max_context_files: 8,
            max_context_tokens: 6_000,
            auto_validate: true,
            confirm_large_edits: true,
            large_edit_threshold: 50,
        }
    }
}

impl WorkspaceConfig {
    /// Apply the recognised keys of a parsed config object. Keys with the
    /// wrong type keep their current value.
    pub fn merge_json(&mut self, data: &Map<String, Value>) {
        if let Some(v) = data.get("max_file_size").and_then(Value::as_u64) {
            self.max_file_size = v;
        }
        if let Some(v) = usize_key(data, "max_context_files") {
            self.max_context_files = v;
        }
        if let Some(v) = usize_key(data, "max_context_tokens") {
            self.max_context_tokens = v;
        }
        if let Some(v) = usize_key(data, "large_edit_threshold") {
            self.large_edit_threshold = v;
        }
        if let Some(v) = data.get("auto_validate").and_then(Value::as_bool) {
            self.auto_validate = v;
        }
        if let Some(v) = data.get("confirm_large_edits").and_then(Value::as_bool) {
            self.confirm_large_edits = v;
        }
    }
}

fn usize_key(data: &Map<String, Value>, key: &str) -> Option<usize> {
    data.get(key)
        .and_then(Value::as_u64)
        .and_then(|v| usize::try_from(v).ok())
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(STATE_DIR).join(CONFIG_FILE_NAME)
}

pub fn rules_path(root: &Path) -> PathBuf {
    root.join(STATE_DIR).join(RULES_FILE_NAME)
}

/// Load the workspace config, falling back to defaults for anything missing
/// or malformed.
pub fn load_workspace_config(root: &Path) -> WorkspaceConfig {
    let mut config = WorkspaceConfig::default();
    let path = config_path(root);
    if !path.is_file() {
        return config;
    }

    let data = match std::fs::read(&path)
        .map_err(|e| e.to_string())
        .and_then(|bytes| serde_json::from_slice::<Value>(&bytes).map_err(|e| e.to_string()))
    {
        Ok(data) => data,
        Err(e) => {
            log::warn!("Ignoring unreadable config {}: {e}", path.display());
            return config;
        }
    };

    match data.as_object() {
        Some(object) => config.merge_json(object),
        None => log::warn!("Ignoring config {}: not a JSON object", path.display()),
    }
    config
}

/// Load `.localai/rules.md`, capped at [`MAX_RULES_BYTES`] on a character
/// boundary. Missing or unreadable files yield an empty string.
pub fn load_workspace_rules(root: &Path) -> String {
    let path = rules_path(root);
    if !path.is_file() {
        return String::new();
    }
    match std::fs::read(&path) {
        Ok(bytes) => {
            let mut text = String::from_utf8_lossy(&bytes).into_owned();
            if text.len() > MAX_RULES_BYTES {
                let mut cut = MAX_RULES_BYTES;
                while !text.is_char_boundary(cut) {
                    cut -= 1;
                }
                text.truncate(cut);
            }
            text
        }
        Err(e) => {
            log::debug!("Failed to read rules {}: {e}", path.display());
            String::new()
        }
    }
}
