//! Text helpers for user- and provider-supplied strings.

/// Longest excerpt of a remote response kept in an error message.
const EXCERPT_CHARS: usize = 180;

/// Trimmed copy of `value`, or `None` when nothing but whitespace is left.
pub fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// [`non_blank`] over optional owned input.
pub fn non_blank_owned(value: Option<String>) -> Option<String> {
    value.as_deref().and_then(non_blank)
}

/// Whether `value` is an http(s) URL with something after the scheme.
///
/// The scheme is matched case-insensitively.
pub fn is_web_url(value: &str) -> bool {
    ["http://", "https://"].iter().any(|scheme| {
        value.len() > scheme.len()
            && value
                .get(..scheme.len())
                .is_some_and(|head| head.eq_ignore_ascii_case(scheme))
    })
}

/// Single-line, bounded excerpt of a response body.
pub fn excerpt(body: &str) -> String {
    body.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .take(EXCERPT_CHARS)
        .collect()
}
