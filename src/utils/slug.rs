// src/utils/slug.rs

use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

static NON_ALPHANUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("valid regex"));

/// Fallback base when a title has no usable characters (e.g. only punctuation).
const FALLBACK_SLUG: &str = "post";

/// Normalizes a title into a URL-safe slug.
///
/// Diacritics are folded away ("Café Olé" -> "cafe-ole"); every other run of
/// characters outside `[a-z0-9]` becomes a single `-`.
pub fn slugify(input: &str) -> String {
    let folded: String = input
        .to_lowercase()
        .nfd()
        .filter(|c| !('\u{0300}'..='\u{036f}').contains(c))
        .collect();

    NON_ALPHANUMERIC
        .replace_all(&folded, "-")
        .trim_matches('-')
        .to_string()
}

/// Builds the storage key of a new post.
///
/// The base is the requested slug if given, otherwise the tile title, otherwise
/// the header. A millisecond timestamp suffix keeps repeated titles apart.
pub fn post_slug(requested: Option<&str>, tile_title: &str, header: &str, timestamp_millis: i64) -> String {
    let source = [requested.unwrap_or_default(), tile_title, header]
        .into_iter()
        .find(|candidate| !candidate.trim().is_empty())
        .unwrap_or_default();

    let base = slugify(source);
    let base = if base.is_empty() { FALLBACK_SLUG } else { base.as_str() };

    format!("{}-{}", base, timestamp_millis)
}
