//! Tag name normalization rules
//!
//! Pure string functions, no I/O. Every name stored or queried goes
//! through [`normalize_name`] exactly once; the function is idempotent so
//! double-normalizing is harmless.

/// Normalize a raw tag name
///
/// Lowercases, replaces spaces with underscores, strips leading runs of
/// `-`/`~` (which carry clause meaning in queries, not name meaning), and
/// removes every `*` (reserved for wildcard patterns).
///
/// # Examples
/// ```
/// use tagquery::tag::normalize_name;
///
/// assert_eq!(normalize_name("  Foo Bar"), "foo_bar");
/// assert_eq!(normalize_name("--foo"), "foo");
/// assert_eq!(normalize_name("***foo"), "foo");
/// ```
#[must_use]
pub fn normalize_name(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase().replace(' ', "_");
    lowered.trim_start_matches(['-', '~']).replace('*', "")
}

/// Split a free-form tag list into normalized tokens
///
/// Lowercases, strips `%` and `,` characters, splits on whitespace, and
/// de-duplicates preserving first-seen order. Used by ingestion-facing
/// callers that accept comma-ish tag lists.
#[must_use]
pub fn scan_tags(text: &str) -> Vec<String> {
    let cleaned: String = text
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| *c != '%' && *c != ',')
        .collect();

    let mut seen = std::collections::HashSet::new();
    cleaned
        .split_whitespace()
        .filter(|t| seen.insert(t.to_string()))
        .map(ToString::to_string)
        .collect()
}
