//! In-place compaction of older conversation turns.
//!
//! The first message (the original task) and the last `keep_recent` messages
//! are never modified. Everything in between has long text cut down to a
//! short prefix plus a marker. Cut text is always shorter than the threshold
//! that triggers a cut, so pruning twice equals pruning once.

use context_protocol::{ContentBlock, Message, MessageContent, ToolResultContent};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const TEXT_PRUNE_THRESHOLD: usize = 200;
pub const TEXT_KEEP_CHARS: usize = 80;
pub const TEXT_PRUNE_MARKER: &str = "\n[...pruned]";

pub const TOOL_PRUNE_THRESHOLD: usize = 150;
pub const TOOL_KEEP_CHARS: usize = 60;
pub const TOOL_PRUNE_MARKER: &str = "...[pruned]";

const CHARS_PER_SAVED_TOKEN: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrunerConfig {
    /// Trailing messages kept verbatim
    pub keep_recent: usize,
}

impl Default for PrunerConfig {
    fn default() -> Self {
        Self { keep_recent: 4 }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PruneReport {
    /// False when the history was too short to prune
    pub pruned: bool,
    pub messages: usize,
    pub chars_before: usize,
    pub chars_after: usize,
    pub tokens_saved: usize,
}

/// Compact `messages[1 .. len - keep_recent]` in place.
///
/// Does nothing unless there are more than `keep_recent + 2` messages.
pub fn prune_messages(messages: &mut [Message], keep_recent: usize) -> PruneReport {
    let total = messages.len();
    if total <= keep_recent.saturating_add(2) {
        return PruneReport {
            messages: total,
            ..PruneReport::default()
        };
    }

    let chars_before = history_chars(messages);
    for message in &mut messages[1..total - keep_recent] {
        prune_message(message);
    }
    let chars_after = history_chars(messages);
    let tokens_saved = chars_before.saturating_sub(chars_after) / CHARS_PER_SAVED_TOKEN;

    if tokens_saved > 0 {
        log::info!("Pruned conversation history: {total} messages, ~{tokens_saved} tokens saved");
    }

    PruneReport {
        pruned: true,
        messages: total,
        chars_before,
        chars_after,
        tokens_saved,
    }
}

fn history_chars(messages: &[Message]) -> usize {
    messages.iter().map(Message::content_chars).sum()
}

fn prune_message(message: &mut Message) {
    // Plain-string content is the original task shape and stays as is.
    let MessageContent::Blocks(blocks) = &mut message.content else {
        return;
    };
    for block in blocks {
        prune_block(block);
    }
}

fn prune_block(block: &mut ContentBlock) {
    match block {
        ContentBlock::Text { text, .. } => {
            cut(text, TEXT_PRUNE_THRESHOLD, TEXT_KEEP_CHARS, TEXT_PRUNE_MARKER);
        }
        ContentBlock::ToolUse { input, .. } => {
            for value in input.values_mut() {
                if let Value::String(text) = value {
                    cut(text, TOOL_PRUNE_THRESHOLD, TOOL_KEEP_CHARS, TOOL_PRUNE_MARKER);
                }
            }
        }
        ContentBlock::ToolResult { content, .. } => match content {
            ToolResultContent::Text(text) => {
                cut(text, TOOL_PRUNE_THRESHOLD, TOOL_KEEP_CHARS, TOOL_PRUNE_MARKER);
            }
            ToolResultContent::Blocks(nested) => {
                for inner in nested {
                    if let ContentBlock::Text { text, .. } = inner {
                        cut(text, TOOL_PRUNE_THRESHOLD, TOOL_KEEP_CHARS, TOOL_PRUNE_MARKER);
                    }
                }
            }
        },
        ContentBlock::Opaque(_) => {}
    }
}

/// Replace `text` with its first `keep` chars plus `marker` when it is longer
/// than `threshold` chars.
fn cut(text: &mut String, threshold: usize, keep: usize, marker: &str) {
    if text.chars().count() <= threshold {
        return;
    }
    if let Some((idx, _)) = text.char_indices().nth(keep) {
        text.truncate(idx);
    }
    text.push_str(marker);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Map};

    fn long(ch: char, n: usize) -> String {
        std::iter::repeat(ch).take(n).collect()
    }

    fn tool_round(i: usize) -> [Message; 2] {
        let mut input = Map::new();
        input.insert("path".into(), json!("src/lib.rs"));
        input.insert("content".into(), Value::String(long('c', 400)));
        input.insert("line".into(), json!(12));
        [
            Message::assistant(vec![
                ContentBlock::text(long('t', 300)),
                ContentBlock::tool_use(format!("call-{i}"), "write_file", input),
            ]),
            Message::user_blocks(vec![ContentBlock::tool_result(
                format!("call-{i}"),
                long('r', 500),
            )]),
        ]
    }

    fn history(len: usize) -> Vec<Message> {
        let mut messages = vec![Message::user(long('u', 1_000))];
        let mut i = 0;
        while messages.len() < len {
            for message in tool_round(i) {
                if messages.len() < len {
                    messages.push(message);
                }
            }
            i += 1;
        }
        messages
    }

    #[test]
    fn short_histories_are_left_alone() {
        let mut messages = history(6);
        let before = messages.clone();
        let report = prune_messages(&mut messages, 4);
        assert!(!report.pruned);
        assert_eq!(messages, before);
    }

    #[test]
    fn only_the_middle_is_pruned() {
        let mut messages = history(10);
        let before = messages.clone();
        let report = prune_messages(&mut messages, 4);

        assert!(report.pruned);
        assert!(report.tokens_saved > 0);
        assert_eq!(messages[0], before[0]);
        assert_eq!(&messages[6..], &before[6..]);
        for i in 1..6 {
            assert!(messages[i].content_chars() < before[i].content_chars(), "message {i}");
        }
    }

    #[test]
    fn cuts_follow_block_rules() {
        let mut messages = history(8);
        prune_messages(&mut messages, 4);

        let MessageContent::Blocks(blocks) = &messages[1].content else {
            panic!("assistant blocks");
        };
        assert_eq!(blocks[0], ContentBlock::text(format!("{}{TEXT_PRUNE_MARKER}", long('t', 80))));
        let ContentBlock::ToolUse { input, .. } = &blocks[1] else {
            panic!("tool use");
        };
        assert_eq!(input["content"], json!(format!("{}{TOOL_PRUNE_MARKER}", long('c', 60))));
        assert_eq!(input["path"], json!("src/lib.rs"));
        assert_eq!(input["line"], json!(12));

        let MessageContent::Blocks(blocks) = &messages[2].content else {
            panic!("user blocks");
        };
        assert_eq!(
            blocks[0],
            ContentBlock::tool_result("call-0", format!("{}{TOOL_PRUNE_MARKER}", long('r', 60)))
        );
    }

    #[test]
    fn nested_result_text_and_opaque_blocks() {
        let opaque = json!({"type": "image", "source": {"data": long('i', 500)}});
        let mut messages = history(8);
        messages[3] = Message::user_blocks(vec![
            ContentBlock::ToolResult {
                tool_use_id: "x".into(),
                content: ToolResultContent::Blocks(vec![
                    ContentBlock::text(long('n', 151)),
                    ContentBlock::text(long('s', 150)),
                ]),
                is_error: Some(false),
                extra: serde_json::Map::new(),
            },
            ContentBlock::Opaque(opaque.clone()),
        ]);
        messages[2] = Message::user(long('p', 5_000));

        prune_messages(&mut messages, 4);

        assert_eq!(messages[2], Message::user(long('p', 5_000)));
        let MessageContent::Blocks(blocks) = &messages[3].content else {
            panic!("blocks");
        };
        let ContentBlock::ToolResult { content: ToolResultContent::Blocks(nested), .. } = &blocks[0]
        else {
            panic!("nested result");
        };
        assert_eq!(nested[0], ContentBlock::text(format!("{}{TOOL_PRUNE_MARKER}", long('n', 60))));
        assert_eq!(nested[1], ContentBlock::text(long('s', 150)));
        assert_eq!(blocks[1], ContentBlock::Opaque(opaque));
    }

    #[test]
    fn pruning_converges() {
        let mut messages = history(12);
        prune_messages(&mut messages, 4);
        let once = messages.clone();

        let report = prune_messages(&mut messages, 4);
        assert_eq!(messages, once);
        assert_eq!(report.tokens_saved, 0);
        assert_eq!(report.chars_before, report.chars_after);
    }

    #[test]
    fn multibyte_text_is_cut_on_char_boundaries() {
        let mut text = long('ж', 250);
        cut(&mut text, TEXT_PRUNE_THRESHOLD, TEXT_KEEP_CHARS, TEXT_PRUNE_MARKER);
        assert_eq!(text, format!("{}{TEXT_PRUNE_MARKER}", long('ж', 80)));
    }
}
