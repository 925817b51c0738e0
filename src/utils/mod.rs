//! Project-specific utilities live here.

/// Trimmed query text, or `None` when nothing but whitespace was given.
pub fn normalize_query(query: &str) -> Option<&str> {
    let trimmed = query.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// Case-insensitive substring test; `needle` must already be lowercase.
pub fn contains_folded(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}
