//! Cleanup applied to extracted titles before they are cached.

use std::sync::LazyLock;

use regex::Regex;

static NEWLINES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?:\r?\n)+").expect("valid regex"));

/// Trim the title and collapse every run of newlines into a single space.
pub fn normalize_title(raw: &str) -> String {
    NEWLINES.replace_all(raw.trim(), " ").into_owned()
}
