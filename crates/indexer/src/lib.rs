//! # Context Indexer
//!
//! Structural model of a workspace: which files exist, what they hash to,
//! which language they are in, and which symbols and imports they declare.
//!
//! ## Pipeline
//!
//! ```text
//! Directory
//!     │
//!     ├──> File Scanner (ignore rules, size cap)
//!     │      └─> Candidate files
//!     │
//!     ├──> Indexer (SHA-256, symbols, imports)
//!     │      └─> FileIndex
//!     │
//!     └──> Cache (.localai/cache/index.json)
//!            └─> Seeds the next open
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use context_indexer::Workspace;
//!
//! fn main() -> context_indexer::Result<()> {
//!     let mut workspace = Workspace::new("/path/to/project")?;
//!     let report = workspace.open();
//!     println!("Indexed {} files ({} changed)", report.files, report.changed);
//!
//!     let (changed, removed) = workspace.refresh();
//!     println!("{} changed, {} removed", changed.len(), removed.len());
//!     Ok(())
//! }
//! ```

mod cache;
mod config;
mod error;
mod ignore;
mod indexer;
mod language;
mod notify;
mod project;
mod record;
mod scanner;
mod stats;
mod symbols;
mod workspace;

pub use cache::{index_cache_path, load_index_cache, save_index_cache};
pub use config::{
    load_workspace_config, load_workspace_rules, WorkspaceConfig, MAX_RULES_BYTES, STATE_DIR,
};
pub use error::{IndexerError, Result};
pub use ignore::IgnoreRules;
pub use indexer::{hash_file, Indexer, PathRefresh};
pub use language::Language;
pub use notify::PathChangeListener;
pub use project::detect_project_types;
pub use record::{FileIndex, FileRecord, ScanDelta};
pub use scanner::{relative_path, FileScanner, ScannedFile};
pub use stats::{WorkspaceStats, OTHER_LANGUAGE};
pub use symbols::{Symbol, SymbolKind, SymbolRule, SymbolRules, IMPORT_SCAN_LINES};
pub use workspace::{file_stem, init_workspace, OpenMode, OpenReport, Workspace};
