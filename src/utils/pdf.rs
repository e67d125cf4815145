//! PDF text extraction utilities.
//!
//! Page text comes from the pdf-extract crate. When pdf-extract rejects a file
//! (or panics on it, which it does for some malformed fonts) lopdf is tried
//! page by page before giving up.
//!
//! pdf-extract has no page limit, so it decodes the whole document and the
//! result is truncated afterwards. Long documents cost a full parse, and a
//! font failure on any page sends the file down the lopdf path. The lopdf
//! fallback only decodes the pages it keeps.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during PDF extraction
#[derive(Debug, Error)]
pub enum PdfExtractError {
    #[error("Failed to extract text from PDF: {0}")]
    ExtractionFailed(String),

    #[error("File not found or not a valid PDF: {0}")]
    InvalidFile(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Something that can turn a PDF file into per-page text.
///
/// Pages without extractable text are returned as empty strings so page
/// indices stay aligned with the document.
pub trait DocumentReader: Send + Sync {
    /// Read the text of at most `max_pages` leading pages of `path`.
    fn read_pages(&self, path: &Path, max_pages: usize) -> Result<Vec<String>, PdfExtractError>;
}

/// [`DocumentReader`] backed by pdf-extract with a lopdf fallback.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfReader;

impl PdfReader {
    pub fn new() -> Self {
        Self
    }
}

impl DocumentReader for PdfReader {
    fn read_pages(&self, path: &Path, max_pages: usize) -> Result<Vec<String>, PdfExtractError> {
        if !path.is_file() {
            return Err(PdfExtractError::InvalidFile(format!(
                "Not a file: {}",
                path.display()
            )));
        }

        let bytes = std::fs::read(path)?;

        match extract_with_pdf_extract(&bytes) {
            Ok(mut pages) => {
                pages.truncate(max_pages);
                Ok(pages)
            }
            Err(primary) => {
                tracing::debug!(
                    "pdf-extract failed on {}: {}; trying lopdf",
                    path.display(),
                    primary
                );
                extract_with_lopdf(&bytes, max_pages).map_err(|fallback| {
                    PdfExtractError::ExtractionFailed(format!("{}; lopdf: {}", primary, fallback))
                })
            }
        }
    }
}

fn extract_with_pdf_extract(bytes: &[u8]) -> Result<Vec<String>, String> {
    match std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem_by_pages(bytes)) {
        Ok(Ok(pages)) => Ok(pages),
        Ok(Err(e)) => Err(e.to_string()),
        Err(_) => Err("pdf-extract panicked".to_string()),
    }
}

fn extract_with_lopdf(bytes: &[u8], max_pages: usize) -> Result<Vec<String>, String> {
    let document = lopdf::Document::load_mem(bytes).map_err(|e| e.to_string())?;

    let page_numbers: Vec<u32> = document.get_pages().keys().copied().take(max_pages).collect();
    if page_numbers.is_empty() {
        return Err("document has no pages".to_string());
    }

    // A page lopdf cannot decode still occupies its slot.
    Ok(page_numbers
        .into_iter()
        .map(|number| document.extract_text(&[number]).unwrap_or_default())
        .collect())
}

/// An opened PDF: its path plus the text of its leading pages.
///
/// Pages are read once when the document is opened, up to the page budget
/// the caller asks for.
#[derive(Debug, Clone)]
pub struct Document {
    path: PathBuf,
    pages: Vec<String>,
}

impl Document {
    /// Open `path` with `reader`, keeping at most `max_pages` pages.
    pub fn open(
        reader: &dyn DocumentReader,
        path: &Path,
        max_pages: usize,
    ) -> Result<Self, PdfExtractError> {
        let pages = reader.read_pages(path, max_pages)?;
        Ok(Self::from_pages(path, pages))
    }

    /// Build a document from already-extracted page text.
    pub fn from_pages(path: &Path, pages: Vec<String>) -> Self {
        Self {
            path: path.to_path_buf(),
            pages,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Text of the first `n` pages (fewer if the document is shorter).
    pub fn pages(&self, n: usize) -> &[String] {
        &self.pages[..n.min(self.pages.len())]
    }

    /// Raw text of the first page, if it has any non-whitespace content.
    pub fn first_page_text(&self) -> Option<&str> {
        self.pages
            .first()
            .map(String::as_str)
            .filter(|text| !text.trim().is_empty())
    }
}
