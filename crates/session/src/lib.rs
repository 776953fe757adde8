//! # Context Session
//!
//! Conversation state for an agent loop: the message history with its
//! pruning pass, the sent-content cache, and the workspace they refer to.

mod prune;
mod session;

pub use prune::{
    prune_messages, PruneReport, PrunerConfig, TEXT_PRUNE_MARKER, TEXT_PRUNE_THRESHOLD,
    TOOL_PRUNE_MARKER, TOOL_PRUNE_THRESHOLD,
};
pub use session::Session;
