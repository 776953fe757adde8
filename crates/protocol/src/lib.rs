//! # Context Protocol
//!
//! Wire-level types shared between the workspace engine and the reasoning
//! engine loop.
//!
//! Conversation content arrives in several shapes (plain strings, typed block
//! lists, nested tool results). Everything is decoded into one tagged
//! [`ContentBlock`] model up front, so downstream code (pruning, accounting)
//! only ever matches on a single enum. Blocks that do not fit any known shape
//! are kept verbatim as [`ContentBlock::Opaque`].

mod message;

pub use message::{ContentBlock, Message, MessageContent, Role, ToolResultContent};

/// Number of characters a value occupies once serialized to JSON.
///
/// Used for observability figures only; serialization failures count as zero.
pub fn serialized_chars<T: serde::Serialize>(value: &T) -> usize {
    serde_json::to_string(value)
        .map(|raw| raw.chars().count())
        .unwrap_or(0)
}
