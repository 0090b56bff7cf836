use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// I/O failures while sampling a file for classification.
#[derive(Debug, Error)]
pub enum DetectError {
    #[error("failed to open file: {0}")]
    Open(#[source] io::Error),

    #[error("failed to read file sample: {0}")]
    ReadSample(#[source] io::Error),
}

/// Failures of a PDF backend. Only [`PdfError::Io`] is surfaced to callers;
/// everything else means the document or page simply has no usable text.
#[derive(Debug, Error)]
pub enum PdfError {
    #[error("PDF parse error: {0}")]
    Parse(#[from] lopdf::Error),

    #[error("I/O error while reading PDF: {0}")]
    Io(#[from] io::Error),

    #[error("failed to extract text from page {page}: {reason}")]
    Page { page: u32, reason: String },
}

/// Fatal errors of [`extract_text`](super::extract_text).
///
/// Negative outcomes such as "not a text file" are not errors, they are
/// reported through [`ExtractedDocument`](super::ExtractedDocument).
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("failed to analyze file type: {0}")]
    AnalyzeFileType(#[from] DetectError),

    #[error("failed to read file {}: {source}", path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to open PDF file: {0}")]
    OpenPdf(#[source] io::Error),

    #[error("failed to get PDF file info: {0}")]
    PdfFileInfo(#[source] io::Error),

    #[error("failed to read PDF file: {0}")]
    ReadPdf(#[source] io::Error),
}

impl ExtractError {
    /// Short machine-readable code used in tool error payloads.
    pub fn code(&self) -> &'static str {
        match self {
            ExtractError::AnalyzeFileType(_) => "ANALYZE_FAILED",
            ExtractError::ReadFile { .. } => "READ_FAILED",
            ExtractError::OpenPdf(_) | ExtractError::PdfFileInfo(_) | ExtractError::ReadPdf(_) => {
                "PDF_IO_FAILED"
            }
        }
    }
}
