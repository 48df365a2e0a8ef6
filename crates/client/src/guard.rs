//! Sanity check applied before a displayed title is replaced.

/// Resolved titles longer than this are not shown.
pub const MAX_TITLE_CHARS: usize = 500;

/// Whether `resolved` should replace the truncated `current` title.
///
/// Ellipses are removed from `current` first. The resolved title must be at
/// least as long as what remains and at most [`MAX_TITLE_CHARS`] characters.
/// Lengths are counted in characters, not bytes.
pub fn should_replace(current: &str, resolved: &str) -> bool {
    let stripped = current.replace("...", "").replace('…', "");
    let resolved_len = resolved.chars().count();
    resolved_len >= stripped.chars().count() && resolved_len <= MAX_TITLE_CHARS
}
