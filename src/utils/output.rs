use std::borrow::Cow;

use serde_json::{json, Value};

/// Appended to text cut by [`truncate_chars`] in tool responses.
pub const TRUNCATION_MARKER: &str = "... [Content truncated due to length]";

/// Limits `text` to `max_chars` characters, marker included.
///
/// Cuts on character boundaries. When `max_chars` cannot even hold the
/// marker, the text is cut without one.
pub fn truncate_chars<'a>(text: &'a str, max_chars: usize, marker: &str) -> Cow<'a, str> {
    if text.chars().count() <= max_chars {
        return Cow::Borrowed(text);
    }

    let marker_chars = marker.chars().count();
    let (keep, marker) = if max_chars > marker_chars {
        (max_chars - marker_chars, marker)
    } else {
        (max_chars, "")
    };

    let end = text
        .char_indices()
        .nth(keep)
        .map(|(idx, _)| idx)
        .unwrap_or(text.len());

    let mut out = String::with_capacity(end + marker.len());
    out.push_str(&text[..end]);
    out.push_str(marker);
    Cow::Owned(out)
}

/// Error body for tool failures: a readable first line, then a JSON object
/// with `code`, `message` and `details`.
pub fn build_error_payload(code: &str, message: &str, details: Value) -> String {
    let obj = json!({
        "code": code,
        "message": message,
        "details": details,
    });
    format!("{}\n{}", message, obj)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_borrowed() {
        assert!(matches!(truncate_chars("hello", 5, "..."), Cow::Borrowed("hello")));
    }

    #[test]
    fn truncates_on_char_boundaries() {
        let out = truncate_chars("héllo wörld", 8, "...");
        assert_eq!(out, "héllo...");
        assert_eq!(out.chars().count(), 8);
    }

    #[test]
    fn drops_marker_when_limit_is_tiny() {
        assert_eq!(truncate_chars("abcdef", 2, "..."), "ab");
        assert_eq!(truncate_chars("abcdef", 0, "..."), "");
    }

    #[test]
    fn error_payload_has_message_line_and_json() {
        let payload = build_error_payload("READ_FAILED", "failed to read file", json!({"path": "a.txt"}));
        let (first, rest) = payload.split_once('\n').unwrap();
        assert_eq!(first, "failed to read file");
        let value: Value = serde_json::from_str(rest).unwrap();
        assert_eq!(value["code"], "READ_FAILED");
        assert_eq!(value["details"]["path"], "a.txt");
    }
}
