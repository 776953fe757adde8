//! # Context Search
//!
//! Turns a task instruction and a [`context_indexer::Workspace`] into a
//! bounded context string.
//!
//! ```no_run
//! use context_indexer::Workspace;
//! use context_search::ContextAssembler;
//!
//! fn main() -> context_indexer::Result<()> {
//!     let mut workspace = Workspace::new(".")?;
//!     workspace.open();
//!     let context = ContextAssembler::new(&workspace).build("fix the parser", None);
//!     println!("{context}");
//!     Ok(())
//! }
//! ```

mod assembler;
mod content_cache;
mod relevance;
mod tokens;

pub use assembler::{
    assemble_sections, format_file_summary, BudgetPolicy, ContextAssembler, ContextSection,
    RankedFile, RULES_LABEL, SUMMARIES_LABEL, WORKSPACE_LABEL,
};
pub use content_cache::ContentCache;
pub use relevance::{score_file, INCLUSION_THRESHOLD};
pub use tokens::{chars_for_tokens, estimate_tokens, trim_to_tokens, TRUNCATION_MARKER};
