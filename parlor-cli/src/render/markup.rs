//! Conversion of HTML-ish message markup to plain terminal text.

use once_cell::sync::Lazy;
use regex::Regex;

static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("valid tag pattern"));
static WHITESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));

/// Strips markup tags, unescapes the common entities, and collapses
/// runs of whitespace.
#[must_use]
pub fn to_plain(markup: &str) -> String {
    let stripped = TAG.replace_all(markup, " ");
    let unescaped = stripped
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");
    WHITESPACE.replace_all(unescaped.trim(), " ").into_owned()
}
