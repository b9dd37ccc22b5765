//! Fixed-list, case-insensitive profanity matching.

use std::{borrow::Cow, sync::LazyLock};

use regex::Regex;

/// Terms that may not appear anywhere in message content.
pub const BANNED_TERMS: &[&str] = &["malapalabra", "inapropiado", "ofensivo", "prohibido"];

/// Replacement written over every banned term when redacting.
pub const MASK: &str = "***";

#[allow(clippy::expect_used)]
static BANNED_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    let alternation = BANNED_TERMS
        .iter()
        .map(|term| regex::escape(term))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!("(?i)(?:{alternation})")).expect("banned term pattern is valid")
});

/// Returns true if `content` contains any banned term, ignoring case.
pub fn contains_banned_term(content: &str) -> bool {
    BANNED_PATTERN.is_match(content)
}

/// Replaces every banned term in `content` with [`MASK`].
///
/// Borrows the input unchanged when nothing matched.
pub fn redact(content: &str) -> Cow<'_, str> {
    BANNED_PATTERN.replace_all(content, MASK)
}
