//! Conservative cleanup of loosely formatted reference strings.

use crate::reference::is_passthrough;
use once_cell::sync::Lazy;
use regex::Regex;

static SEPARATOR_WS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*/\s*").expect("valid separator regex"));
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Normalizes a raw reference into a lookup candidate.
///
/// Rules, in order:
/// 1. trim surrounding whitespace, then surrounding `"`/`'` quotes;
/// 2. canonical URNs and `#` pointers are returned as-is;
/// 3. whitespace hugging a `/` separator is dropped, any other whitespace
///    run is collapsed into one `-`.
pub fn sanitize_reference(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches(|c: char| c == '"' || c == '\'');
    if is_passthrough(trimmed) {
        return trimmed.to_string();
    }
    let joined = SEPARATOR_WS_RE.replace_all(trimmed, "/");
    WHITESPACE_RE.replace_all(&joined, "-").into_owned()
}
