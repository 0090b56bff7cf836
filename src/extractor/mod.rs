//! Text detection and extraction for files on disk.
//!
//! [`extract_text`] is the entry point. PDFs go through page-text
//! extraction; every other file is classified by [`classify`] and, when it
//! is text, returned whole after UTF-8 validation.

pub mod detect;
pub mod error;
pub mod extension;
pub mod heuristic;
pub mod mime;
pub mod pdf;
pub mod sniff;

use std::path::Path;

use tracing::debug;

pub use detect::{classify, ClassificationVerdict, DetectionStage};
pub use error::{DetectError, ExtractError, PdfError};
use extension::has_pdf_extension;
use pdf::{extract_pdf_text, DEFAULT_MAX_PDF_PAGES};

/// Result of an extraction attempt. Text is only ever present on success.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedDocument {
    text: Option<String>,
}

impl ExtractedDocument {
    pub fn extracted(text: String) -> Self {
        Self { text: Some(text) }
    }

    /// The file holds no text we can return. Not an error.
    pub fn not_extractable() -> Self {
        Self { text: None }
    }

    pub fn success(&self) -> bool {
        self.text.is_some()
    }

    /// The extracted text, or `""` when extraction did not succeed.
    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }

    pub fn into_text(self) -> Option<String> {
        self.text
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractorConfig {
    /// Pages read from a PDF; later pages are ignored.
    pub max_pdf_pages: u32,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            max_pdf_pages: DEFAULT_MAX_PDF_PAGES,
        }
    }
}

/// What kind of extraction a path is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionKind {
    Pdf,
    Text,
}

impl ExtractionKind {
    pub fn for_path(path: &Path) -> Self {
        if has_pdf_extension(path) {
            ExtractionKind::Pdf
        } else {
            ExtractionKind::Text
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionKind::Pdf => "PDF",
            ExtractionKind::Text => "PlainText",
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Extractor {
    config: ExtractorConfig,
}

impl Extractor {
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }

    pub fn extract(&self, path: &Path) -> Result<ExtractedDocument, ExtractError> {
        match ExtractionKind::for_path(path) {
            ExtractionKind::Pdf => extract_pdf_text(path, self.config.max_pdf_pages),
            ExtractionKind::Text => extract_plain_text(path),
        }
    }
}

/// Extracts the text of a file with the default configuration.
///
/// Returns [`ExtractedDocument::not_extractable`] for files that are not text
/// (binary data, invalid UTF-8, PDFs without a text layer) and an error only
/// when the file cannot be read.
pub fn extract_text(path: &Path) -> Result<ExtractedDocument, ExtractError> {
    Extractor::default().extract(path)
}

fn extract_plain_text(path: &Path) -> Result<ExtractedDocument, ExtractError> {
    let verdict = classify(path)?;
    if !verdict.is_text {
        debug!("{} is not text ({})", path.display(), verdict.mime_hint);
        return Ok(ExtractedDocument::not_extractable());
    }

    let data = std::fs::read(path).map_err(|source| ExtractError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;

    // The verdict may come from a 512-byte sample; the rest of the file
    // still has to be valid UTF-8.
    match String::from_utf8(data) {
        Ok(text) => Ok(ExtractedDocument::extracted(text)),
        Err(_) => {
            debug!("{} is not valid UTF-8", path.display());
            Ok(ExtractedDocument::not_extractable())
        }
    }
}
