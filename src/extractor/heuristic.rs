/// Share of printable bytes a sample must exceed to count as text.
const PRINTABLE_RATIO_THRESHOLD: f64 = 0.85;

/// Decides from a raw byte sample whether the content is likely text.
///
/// - empty samples are text, nothing contradicts it
/// - invalid UTF-8 or any NUL byte rejects the sample
/// - otherwise more than 85% of the bytes must be printable ASCII or
///   tab/newline/carriage return
///
/// The ratio leaves room for a little non-ASCII or control content, such
/// as ANSI colour codes in logs, while rejecting dense binary data.
pub fn is_likely_text(sample: &[u8]) -> bool {
    if sample.is_empty() {
        return true;
    }

    if std::str::from_utf8(sample).is_err() {
        return false;
    }

    if sample.contains(&0) {
        return false;
    }

    let printable = sample.iter().filter(|&&b| is_printable_byte(b)).count();
    let ratio = printable as f64 / sample.len() as f64;
    ratio > PRINTABLE_RATIO_THRESHOLD
}

fn is_printable_byte(b: u8) -> bool {
    matches!(b, 0x20..=0x7E | b'\t' | b'\n' | b'\r')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_text() {
        assert!(is_likely_text(
            b"This is valid ASCII text with numbers 123 and symbols !@#"
        ));
        assert!(is_likely_text(b"Line 1\nLine 2\tTabbed\rCarriage return"));
        assert!(is_likely_text(b"x"));
    }

    #[test]
    fn test_empty_sample() {
        assert!(is_likely_text(b""));
    }

    #[test]
    fn test_null_bytes_reject() {
        assert!(!is_likely_text(&[0x00, 0x01, 0x02, 0x03]));
        assert!(!is_likely_text(b"mostly text but\x00one NUL"));
    }

    #[test]
    fn test_png_header_rejected() {
        assert!(!is_likely_text(&[
            0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A
        ]));
    }

    #[test]
    fn test_control_characters_rejected() {
        assert!(!is_likely_text(&[
            0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08
        ]));
    }

    #[test]
    fn test_ansi_colored_log_accepted() {
        let line = b"\x1b[32mINFO\x1b[0m server started on port 8080 after loading configuration\n";
        assert!(is_likely_text(line));
    }

    #[test]
    fn test_ratio_threshold_is_strict() {
        // 17 printable out of 20 is exactly 0.85, which is not enough.
        let mut at_threshold = vec![b'a'; 17];
        at_threshold.extend_from_slice(&[0x01, 0x02, 0x03]);
        assert!(!is_likely_text(&at_threshold));

        let mut above = vec![b'a'; 18];
        above.extend_from_slice(&[0x01, 0x02]);
        assert!(is_likely_text(&above));
    }

    #[test]
    fn test_non_ascii_heavy_utf8_rejected() {
        // Valid UTF-8, but multi-byte characters do not count as printable.
        assert!(!is_likely_text("привет мир".as_bytes()));
    }
}
