use std::sync::LazyLock;

use regex::Regex;

/// Normalized form of a missing or empty author.
pub const UNKNOWN_AUTHOR: &str = "unknown";

static HTML_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("static pattern compiles"));

// `\s` is Unicode-aware; ideographic and no-break spaces are listed anyway.
static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s\x{3000}\x{00A0}]+").expect("static pattern compiles"));

static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\x{4e00}-\x{9fff}]").expect("static pattern compiles"));

/// Reduce an author display string to a comparable token.
///
/// Strips tags, all whitespace and punctuation, then lowercases. Anything
/// that reduces to nothing becomes [`UNKNOWN_AUTHOR`].
pub fn normalize_author<'a>(author: impl Into<Option<&'a str>>) -> String {
    let Some(author) = author.into().filter(|a| !a.is_empty()) else {
        return UNKNOWN_AUTHOR.to_string();
    };

    let without_tags = HTML_TAG.replace_all(author, "");
    let compact = WHITESPACE.replace_all(&without_tags, "");
    let word_chars = NON_WORD.replace_all(&compact, "");
    let normalized = word_chars.to_lowercase();

    if normalized.is_empty() {
        UNKNOWN_AUTHOR.to_string()
    } else {
        normalized
    }
}
