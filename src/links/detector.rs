use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

/// A bare `http(s)://` run: no whitespace, angle brackets, quotes or token
/// glyphs; parentheses only when balanced one level deep, so the closing
/// paren of `(see https://x.com)` stays outside while
/// `https://en.wikipedia.org/wiki/Rust_(language)` stays whole.
static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"https?://(?:[^\s<>"()⟦⟧]|\([^\s<>"()⟦⟧]*\))+"#)
        .unwrap_or_else(|e| panic!("URL pattern must compile: {e}"))
});

/// Byte ranges of raw URLs in `text`, left to right, non-overlapping.
pub fn detect_urls(text: &str) -> Vec<Range<usize>> {
    URL_PATTERN.find_iter(text).map(|m| m.range()).collect()
}
