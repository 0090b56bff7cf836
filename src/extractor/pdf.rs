//! Page-by-page text extraction from PDF files.
//!
//! The parser sits behind [`PdfBackend`]/[`PdfDocument`] so the page loop can
//! be exercised without real PDFs. [`LopdfBackend`] is the production parser.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use lopdf::{Document, ObjectId};
use tracing::debug;

use super::error::{ExtractError, PdfError};
use super::ExtractedDocument;

/// Default number of pages read from a single document.
pub const DEFAULT_MAX_PDF_PAGES: u32 = 100;

/// An opened PDF document.
pub trait PdfDocument {
    fn page_count(&self) -> u32;

    /// Plain text of a 1-based page. `None` when the document has no page
    /// object at that index.
    fn page_text(&self, page_number: u32) -> Option<Result<String, PdfError>>;
}

/// Opens PDF documents from a file handle.
pub trait PdfBackend {
    type Document: PdfDocument;

    /// Fails with [`PdfError::Io`] when the bytes cannot be read, and with any
    /// other variant when they do not form a usable document.
    fn open(&self, file: File, size: u64) -> Result<Self::Document, PdfError>;
}

/// [`PdfBackend`] built on `lopdf`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfBackend;

pub struct LopdfDocument {
    document: Document,
    pages: BTreeMap<u32, ObjectId>,
}

impl PdfBackend for LopdfBackend {
    type Document = LopdfDocument;

    /// lopdf parses from memory, so the whole file is read up front whatever
    /// the page cap is.
    fn open(&self, file: File, size: u64) -> Result<LopdfDocument, PdfError> {
        let mut bytes = Vec::with_capacity(size as usize);
        file.take(size).read_to_end(&mut bytes)?;

        let document = Document::load_mem(&bytes)?;
        let pages = document.get_pages();
        Ok(LopdfDocument { document, pages })
    }
}

impl PdfDocument for LopdfDocument {
    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn page_text(&self, page_number: u32) -> Option<Result<String, PdfError>> {
        self.pages.get(&page_number)?;
        Some(
            self.document
                .extract_text(&[page_number])
                .map(strip_text_object_break)
                .map_err(|e| PdfError::Page {
                    page: page_number,
                    reason: e.to_string(),
                }),
        )
    }
}

/// lopdf ends every text object (`ET`) with a line break; the page loop adds
/// its own separator.
fn strip_text_object_break(mut text: String) -> String {
    if text.ends_with('\n') {
        text.pop();
    }
    text
}

/// Extracts the text of a PDF using [`LopdfBackend`].
pub fn extract_pdf_text(path: &Path, max_pages: u32) -> Result<ExtractedDocument, ExtractError> {
    extract_pdf_text_with(&LopdfBackend, path, max_pages)
}

/// Extracts the text of up to `max_pages` leading pages, joined by newlines.
///
/// A file that cannot be opened or stat'ed is an error. A document the
/// backend cannot parse, or one without any non-blank page text, is not.
/// Pages past `max_pages` are dropped without telling the caller.
pub fn extract_pdf_text_with<B: PdfBackend>(
    backend: &B,
    path: &Path,
    max_pages: u32,
) -> Result<ExtractedDocument, ExtractError> {
    let file = File::open(path).map_err(ExtractError::OpenPdf)?;
    let size = file.metadata().map_err(ExtractError::PdfFileInfo)?.len();

    let document = match backend.open(file, size) {
        Ok(document) => document,
        Err(PdfError::Io(e)) => return Err(ExtractError::ReadPdf(e)),
        Err(e) => {
            debug!("{} is not a readable PDF: {}", path.display(), e);
            return Ok(ExtractedDocument::not_extractable());
        }
    };

    let page_count = document.page_count();
    let last_page = page_count.min(max_pages);
    if page_count > max_pages {
        debug!(
            "{} has {} pages, reading only the first {}",
            path.display(),
            page_count,
            max_pages
        );
    }

    let mut pages = Vec::new();
    for page_number in 1..=last_page {
        match document.page_text(page_number) {
            Some(Ok(text)) => pages.push(text),
            Some(Err(e)) => debug!("skipping page {} of {}: {}", page_number, path.display(), e),
            None => debug!("page {} of {} is missing", page_number, path.display()),
        }
    }

    let text = pages.join("\n");
    if text.trim().is_empty() {
        return Ok(ExtractedDocument::not_extractable());
    }
    Ok(ExtractedDocument::extracted(text))
}
