//! Helpers for the free-text option fields

/// Splits a comma-separated field into trimmed, non-empty entries
pub fn split_list(input: &str) -> Vec<&str> {
    input
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .collect()
}

/// Trimmed value of a single-value field, or `None` when blank
pub fn non_empty(input: &str) -> Option<&str> {
    let trimmed = input.trim();
    if trimmed.is_empty() { None } else { Some(trimmed) }
}
