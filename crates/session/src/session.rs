use crate::prune::{prune_messages, PruneReport, PrunerConfig};
use context_indexer::{PathChangeListener, Workspace};
use context_protocol::Message;
use context_search::{ContentCache, ContextAssembler};
use std::path::Path;

/// One agent conversation bound to a workspace.
///
/// Owns the message history, the record of file contents already shown to
/// the reasoning engine, and the workspace those files come from.
pub struct Session {
    workspace: Workspace,
    content_cache: ContentCache,
    messages: Vec<Message>,
    pruner: PrunerConfig,
}

impl Session {
    pub fn new(workspace: Workspace) -> Self {
        Self::with_pruner(workspace, PrunerConfig::default())
    }

    pub fn with_pruner(workspace: Workspace, pruner: PrunerConfig) -> Self {
        Self {
            workspace,
            content_cache: ContentCache::new(),
            messages: Vec::new(),
            pruner,
        }
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn workspace_mut(&mut self) -> &mut Workspace {
        &mut self.workspace
    }

    /// Budgeted context for `task`.
    pub fn task_context(&self, task: &str, active_file: Option<&str>) -> String {
        ContextAssembler::new(&self.workspace).build(task, active_file)
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Compact older history before the next request goes out.
    pub fn prepare_round(&mut self) -> PruneReport {
        prune_messages(&mut self.messages, self.pruner.keep_recent)
    }

    /// Drop history and sent-content records, then pick up on-disk changes.
    pub fn reset(&mut self) -> (Vec<String>, Vec<String>) {
        self.messages.clear();
        self.content_cache.clear();
        self.workspace.refresh()
    }

    pub fn content_cache(&self) -> &ContentCache {
        &self.content_cache
    }

    pub fn content_cache_mut(&mut self) -> &mut ContentCache {
        &mut self.content_cache
    }
}

impl PathChangeListener for Session {
    fn path_changed(&mut self, abs_path: &Path) {
        for rel in self.workspace.notify_path_changed(abs_path) {
            self.content_cache.invalidate(&rel);
        }
    }
}
