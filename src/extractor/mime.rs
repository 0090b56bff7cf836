/// `application/*` types that carry text. Anything under `text/` is accepted
/// without being listed here.
pub const TEXT_APPLICATION_TYPES: &[&str] = &[
    "application/json",
    "application/xml",
    "application/javascript",
    "application/x-sh",
    "application/x-python",
    "application/x-perl",
    "application/x-ruby",
    "application/x-php",
    "application/sql",
    "application/yaml",
    "application/x-yaml",
];

/// Checks whether a MIME type denotes textual content.
///
/// Parameters such as `charset` are ignored, so `text/plain; charset=utf-8`
/// is treated like `text/plain`.
pub fn is_text_content_type(content_type: &str) -> bool {
    let main_type = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();

    main_type.starts_with("text/") || TEXT_APPLICATION_TYPES.contains(&main_type.as_str())
}

#[cfg(test)]
mod tests {
    use super::is_text_content_type;

    #[test]
    fn accepts_text_types() {
        for ct in [
            "text/plain",
            "text/plain; charset=utf-8",
            "text/html",
            "text/css",
            "text/javascript",
            "text/anything",
            "  TEXT/Markdown ; charset=UTF-8",
        ] {
            assert!(is_text_content_type(ct), "{ct}");
        }
    }

    #[test]
    fn accepts_listed_application_types() {
        for ct in [
            "application/json",
            "application/xml",
            "application/javascript",
            "application/x-sh",
            "application/x-yaml; charset=utf-8",
            "Application/SQL",
        ] {
            assert!(is_text_content_type(ct), "{ct}");
        }
    }

    #[test]
    fn rejects_binary_types() {
        for ct in [
            "image/png",
            "image/jpeg",
            "application/pdf",
            "application/octet-stream",
            "video/mp4",
            "application/json-seq",
            "",
        ] {
            assert!(!is_text_content_type(ct), "{ct}");
        }
    }
}
