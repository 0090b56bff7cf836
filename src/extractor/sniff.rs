//! Signature-based content sniffing over the leading bytes of a file.
//!
//! The table follows the MIME sniffing algorithm used by browsers and HTTP
//! servers: patterns are tried in order and the first match wins. Only the
//! first [`SNIFF_LEN`] bytes are ever examined.

/// Maximum number of leading bytes considered by [`detect_content_type`].
pub const SNIFF_LEN: usize = 512;

/// Returned when no signature matches.
pub const OCTET_STREAM: &str = "application/octet-stream";

const TEXT_PLAIN_UTF8: &str = "text/plain; charset=utf-8";
const TEXT_HTML_UTF8: &str = "text/html; charset=utf-8";

enum Signature {
    /// Input starts with the bytes.
    Exact(&'static [u8], &'static str),
    /// `input[i] & mask[i] == pattern[i]` for every i, optionally after
    /// skipping leading whitespace.
    Masked {
        mask: &'static [u8],
        pattern: &'static [u8],
        skip_ws: bool,
        mime: &'static str,
    },
    /// Case-insensitive HTML tag after leading whitespace, followed by a
    /// tag-terminating byte.
    Html(&'static [u8]),
    /// ISO base media file with an `mp4` brand in its `ftyp` box.
    Mp4,
    /// No binary control bytes after leading whitespace.
    Text,
}

static SIGNATURES: &[Signature] = &[
    Signature::Html(b"<!DOCTYPE HTML"),
    Signature::Html(b"<HTML"),
    Signature::Html(b"<HEAD"),
    Signature::Html(b"<SCRIPT"),
    Signature::Html(b"<IFRAME"),
    Signature::Html(b"<H1"),
    Signature::Html(b"<DIV"),
    Signature::Html(b"<FONT"),
    Signature::Html(b"<TABLE"),
    Signature::Html(b"<A"),
    Signature::Html(b"<STYLE"),
    Signature::Html(b"<TITLE"),
    Signature::Html(b"<B"),
    Signature::Html(b"<BODY"),
    Signature::Html(b"<BR"),
    Signature::Html(b"<P"),
    Signature::Html(b"<!--"),
    Signature::Masked {
        mask: b"\xFF\xFF\xFF\xFF\xFF",
        pattern: b"<?xml",
        skip_ws: true,
        mime: "text/xml; charset=utf-8",
    },
    Signature::Exact(b"%PDF-", "application/pdf"),
    Signature::Exact(b"%!PS-Adobe-", "application/postscript"),
    // Byte order marks
    Signature::Masked {
        mask: b"\xFF\xFF\x00\x00",
        pattern: b"\xFE\xFF\x00\x00",
        skip_ws: false,
        mime: "text/plain; charset=utf-16be",
    },
    Signature::Masked {
        mask: b"\xFF\xFF\x00\x00",
        pattern: b"\xFF\xFE\x00\x00",
        skip_ws: false,
        mime: "text/plain; charset=utf-16le",
    },
    Signature::Masked {
        mask: b"\xFF\xFF\xFF\x00",
        pattern: b"\xEF\xBB\xBF\x00",
        skip_ws: false,
        mime: TEXT_PLAIN_UTF8,
    },
    // Images
    Signature::Exact(b"\x00\x00\x01\x00", "image/x-icon"),
    Signature::Exact(b"\x00\x00\x02\x00", "image/x-icon"),
    Signature::Exact(b"BM", "image/bmp"),
    Signature::Exact(b"GIF87a", "image/gif"),
    Signature::Exact(b"GIF89a", "image/gif"),
    Signature::Masked {
        mask: b"\xFF\xFF\xFF\xFF\x00\x00\x00\x00\xFF\xFF\xFF\xFF\xFF\xFF",
        pattern: b"RIFF\x00\x00\x00\x00WEBPVP",
        skip_ws: false,
        mime: "image/webp",
    },
    Signature::Exact(b"\x89PNG\x0D\x0A\x1A\x0A", "image/png"),
    Signature::Exact(b"\xFF\xD8\xFF", "image/jpeg"),
    // Audio and video
    Signature::Masked {
        mask: b"\xFF\xFF\xFF\xFF\x00\x00\x00\x00\xFF\xFF\xFF\xFF",
        pattern: b"FORM\x00\x00\x00\x00AIFF",
        skip_ws: false,
        mime: "audio/aiff",
    },
    Signature::Masked {
        mask: b"\xFF\xFF\xFF",
        pattern: b"ID3",
        skip_ws: false,
        mime: "audio/mpeg",
    },
    Signature::Masked {
        mask: b"\xFF\xFF\xFF\xFF\xFF",
        pattern: b"OggS\x00",
        skip_ws: false,
        mime: "application/ogg",
    },
    Signature::Masked {
        mask: b"\xFF\xFF\xFF\xFF\xFF\xFF\xFF\xFF",
        pattern: b"MThd\x00\x00\x00\x06",
        skip_ws: false,
        mime: "audio/midi",
    },
    Signature::Masked {
        mask: b"\xFF\xFF\xFF\xFF\x00\x00\x00\x00\xFF\xFF\xFF\xFF",
        pattern: b"RIFF\x00\x00\x00\x00AVI ",
        skip_ws: false,
        mime: "video/avi",
    },
    Signature::Masked {
        mask: b"\xFF\xFF\xFF\xFF\x00\x00\x00\x00\xFF\xFF\xFF\xFF",
        pattern: b"RIFF\x00\x00\x00\x00WAVE",
        skip_ws: false,
        mime: "audio/wave",
    },
    Signature::Mp4,
    Signature::Exact(b"\x1A\x45\xDF\xA3", "video/webm"),
    // Fonts
    Signature::Masked {
        // 34 wildcard bytes, then "LP"
        mask: b"\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\xFF\xFF",
        pattern: b"\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00LP",
        skip_ws: false,
        mime: "application/vnd.ms-fontobject",
    },
    Signature::Exact(b"\x00\x01\x00\x00", "font/ttf"),
    Signature::Exact(b"OTTO", "font/otf"),
    Signature::Exact(b"ttcf", "font/collection"),
    Signature::Exact(b"wOFF", "font/woff"),
    Signature::Exact(b"wOF2", "font/woff2"),
    // Archives
    Signature::Exact(b"\x1F\x8B\x08", "application/x-gzip"),
    Signature::Exact(b"PK\x03\x04", "application/zip"),
    Signature::Exact(b"Rar!\x1A\x07\x00", "application/x-rar-compressed"),
    Signature::Exact(b"Rar!\x1A\x07\x01\x00", "application/x-rar-compressed"),
    Signature::Exact(b"\x00\x61\x73\x6D", "application/wasm"),
    Signature::Text,
];

/// Guesses the MIME type of content from its leading bytes.
///
/// Always returns a valid MIME type, falling back to
/// `application/octet-stream`. Empty input is accepted and sniffs as plain
/// text, since nothing in it contradicts that.
pub fn detect_content_type(sample: &[u8]) -> &'static str {
    let data = &sample[..sample.len().min(SNIFF_LEN)];
    SIGNATURES
        .iter()
        .find_map(|sig| sig.matches(data))
        .unwrap_or(OCTET_STREAM)
}

impl Signature {
    fn matches(&self, data: &[u8]) -> Option<&'static str> {
        match *self {
            Signature::Exact(sig, mime) => data.starts_with(sig).then_some(mime),
            Signature::Masked {
                mask,
                pattern,
                skip_ws,
                mime,
            } => {
                let data = if skip_ws { skip_whitespace(data) } else { data };
                if data.len() < pattern.len() {
                    return None;
                }
                pattern
                    .iter()
                    .zip(mask)
                    .zip(data)
                    .all(|((p, m), d)| d & m == *p)
                    .then_some(mime)
            }
            Signature::Html(tag) => {
                let data = skip_whitespace(data);
                if data.len() < tag.len() + 1 {
                    return None;
                }
                let tag_matches = tag.iter().zip(data).all(|(&t, &d)| {
                    // Upper-case the input byte only where the tag has a letter.
                    let d = if t.is_ascii_uppercase() { d & 0xDF } else { d };
                    t == d
                });
                (tag_matches && is_tag_terminator(data[tag.len()])).then_some(TEXT_HTML_UTF8)
            }
            Signature::Mp4 => is_mp4(data).then_some("video/mp4"),
            Signature::Text => skip_whitespace(data)
                .iter()
                .all(|&b| !is_binary_data_byte(b))
                .then_some(TEXT_PLAIN_UTF8),
        }
    }
}

fn skip_whitespace(data: &[u8]) -> &[u8] {
    let start = data
        .iter()
        .position(|b| !matches!(b, b'\t' | b'\n' | b'\x0C' | b'\r' | b' '))
        .unwrap_or(data.len());
    &data[start..]
}

fn is_tag_terminator(b: u8) -> bool {
    b == b' ' || b == b'>'
}

fn is_binary_data_byte(b: u8) -> bool {
    matches!(b, 0x00..=0x08 | 0x0B | 0x0E..=0x1A | 0x1C..=0x1F)
}

fn is_mp4(data: &[u8]) -> bool {
    if data.len() < 12 {
        return false;
    }
    let box_size = u32::from_be_bytes([data[0], data[1], data[2], data[3]]) as usize;
    if data.len() < box_size || box_size % 4 != 0 {
        return false;
    }
    if &data[4..8] != b"ftyp" {
        return false;
    }
    // Major brand at 8, minor version at 12, compatible brands after that.
    (8..box_size)
        .step_by(4)
        .filter(|&offset| offset != 12)
        .any(|offset| data.get(offset..offset + 3) == Some(b"mp4".as_slice()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_common_binary_signatures() {
        let cases: &[(&[u8], &str)] = &[
            (b"%PDF-1.7\n%", "application/pdf"),
            (b"\x89PNG\x0D\x0A\x1A\x0A", "image/png"),
            (b"GIF89a\x01\x00", "image/gif"),
            (b"\xFF\xD8\xFF\xE0\x00\x10JFIF", "image/jpeg"),
            (b"PK\x03\x04\x14\x00", "application/zip"),
            (b"\x1F\x8B\x08\x00", "application/x-gzip"),
            (b"RIFF\x24\x00\x00\x00WEBPVP8 ", "image/webp"),
            (b"RIFF\x24\x00\x00\x00WAVEfmt ", "audio/wave"),
            (b"\x00asm\x01\x00\x00\x00", "application/wasm"),
        ];
        for (data, expected) in cases {
            assert_eq!(detect_content_type(data), *expected, "{:?}", data);
        }
    }

    #[test]
    fn detects_html_after_whitespace_case_insensitively() {
        assert_eq!(
            detect_content_type(b"  \n<!doctype html><html>"),
            "text/html; charset=utf-8"
        );
        assert_eq!(detect_content_type(b"<p>hi</p>"), "text/html; charset=utf-8");
        // Tag must be terminated by a space or '>'.
        assert_eq!(detect_content_type(b"<pre>x</pre>"), "text/plain; charset=utf-8");
    }

    #[test]
    fn detects_xml_declaration() {
        assert_eq!(
            detect_content_type(b"\n<?xml version=\"1.0\"?><a/>"),
            "text/xml; charset=utf-8"
        );
    }

    #[test]
    fn detects_byte_order_marks() {
        assert_eq!(detect_content_type(b"\xFE\xFF\x00h"), "text/plain; charset=utf-16be");
        assert_eq!(detect_content_type(b"\xFF\xFEh\x00"), "text/plain; charset=utf-16le");
        assert_eq!(detect_content_type(b"\xEF\xBB\xBFhello"), "text/plain; charset=utf-8");
    }

    #[test]
    fn detects_mp4_by_brand() {
        let mut data = Vec::new();
        data.extend_from_slice(&24u32.to_be_bytes());
        data.extend_from_slice(b"ftypisom\x00\x00\x02\x00mp41isom");
        assert_eq!(detect_content_type(&data), "video/mp4");

        let mut no_brand = Vec::new();
        no_brand.extend_from_slice(&16u32.to_be_bytes());
        no_brand.extend_from_slice(b"ftypqt  \x00\x00\x00\x00");
        assert_ne!(detect_content_type(&no_brand), "video/mp4");
    }

    #[test]
    fn plain_text_and_fallback() {
        assert_eq!(detect_content_type(b"hello world\n"), "text/plain; charset=utf-8");
        assert_eq!(detect_content_type(&[0x01, 0x02, 0x03]), OCTET_STREAM);
        // High bytes are not binary data bytes in the text signature.
        assert_eq!(detect_content_type(&[0xFF, 0xFE, 0xFD]), "text/plain; charset=utf-8");
    }

    #[test]
    fn tolerates_empty_and_short_input() {
        assert_eq!(detect_content_type(b""), "text/plain; charset=utf-8");
        assert_eq!(detect_content_type(b"%"), "text/plain; charset=utf-8");
        assert_eq!(detect_content_type(b"\x00"), OCTET_STREAM);
    }

    #[test]
    fn ignores_bytes_past_the_sniff_window() {
        let mut data = vec![b'a'; SNIFF_LEN];
        data.push(0x00);
        assert_eq!(detect_content_type(&data), "text/plain; charset=utf-8");
    }
}
