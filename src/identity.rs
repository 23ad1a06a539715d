//! Stable identifiers for imported occurrences
//!
//! Occurrences are rebuilt at every fetch, and have no identifier of their own. Their ID is derived from their content,
//! so that the same event gets the same ID from one fetch to the next.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

use crate::CalendarDay;

/// Separates the fields of the key. It cannot appear in a URL nor in a formatted day
const FIELD_SEPARATOR: char = '\u{1f}';

/// Prepended to identifiers that would otherwise not start with a letter or an underscore
pub const ID_PREFIX: &str = "ics_";

/// Build the identifier of an occurrence.
///
/// The result only contains ASCII letters, digits, `_` and `-`, and starts with a letter or `_`.
pub fn occurrence_id(source_url: &str, start: CalendarDay, end: CalendarDay, summary: &str) -> String {
    let key = format!(
        "{url}{sep}{start}{sep}{end}{sep}{summary}",
        url = source_url,
        start = start.format("%Y-%m-%d"),
        end = end.format("%Y-%m-%d"),
        summary = summary,
        sep = FIELD_SEPARATOR,
    );
    to_token(&URL_SAFE_NO_PAD.encode(key.as_bytes()))
}

/// Replace every character that is not allowed in a token, and make sure it starts with a letter or `_`
pub fn to_token(raw: &str) -> String {
    let sanitized: String = raw
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
        .collect();

    match sanitized.chars().next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => sanitized,
        _ => format!("{}{}", ID_PREFIX, sanitized),
    }
}

/// Whether `id` is a valid token, as produced by [`to_token`]
pub fn is_token(id: &str) -> bool {
    let mut chars = id.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => (),
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
