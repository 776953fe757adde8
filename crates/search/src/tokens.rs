//! Character-count token estimates.
//!
//! One token is taken as 3.8 characters. Integer arithmetic over tenths keeps
//! the estimate exact and platform independent.

/// Appended to any text cut down to a token allowance.
pub const TRUNCATION_MARKER: &str = "\n\n[... content trimmed to fit token budget]";

const CHARS_PER_TOKEN_X10: usize = 38;

/// Approximate token count of `text`.
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count() * 10 / CHARS_PER_TOKEN_X10
}

/// Characters that fit in `tokens`.
pub fn chars_for_tokens(tokens: usize) -> usize {
    tokens.saturating_mul(CHARS_PER_TOKEN_X10) / 10
}

/// Keep the first `max_tokens` worth of characters, marking the cut. Text that
/// already fits is returned unchanged.
pub fn trim_to_tokens(text: &str, max_tokens: usize) -> String {
    let max_chars = chars_for_tokens(max_tokens);
    match text.char_indices().nth(max_chars) {
        None => text.to_string(),
        Some((cut, _)) => {
            let mut trimmed = String::with_capacity(cut + TRUNCATION_MARKER.len());
            trimmed.push_str(&text[..cut]);
            trimmed.push_str(TRUNCATION_MARKER);
            trimmed
        }
    }
}
