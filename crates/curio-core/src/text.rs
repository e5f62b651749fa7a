//! Text normalization helpers shared across the pipeline.

/// Normalize a raw keyword into a tag slug.
///
/// Lower-cases the input, maps whitespace and non-alphanumeric characters to
/// hyphens, collapses hyphen runs, and trims hyphens from both edges. Returns
/// an empty string when nothing slug-safe remains.
#[must_use]
pub fn slugify_tag(raw: &str) -> String {
    raw.to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Truncate a string to at most `max_chars` characters.
///
/// Operates on `char` boundaries, so the cut is always valid UTF-8. Returns
/// the input unchanged when it already fits.
#[must_use]
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    text.chars().take(max_chars).collect()
}
