//! PDF text extraction using lopdf and pdf-extract.

use lopdf::Document;
use tracing::{debug, warn};

use super::{DocumentSource, Result, StreamTableDetector};
use crate::error::PdfError;
use crate::models::transaction::RawTable;

/// A loaded PDF statement.
pub struct PdfSource {
    document: Document,
    raw_data: Vec<u8>,
    detector: StreamTableDetector,
}

impl PdfSource {
    /// Load a PDF from bytes, decrypting it if it uses an empty password.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut document = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        let raw_data = if document.is_encrypted() {
            if document.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            // pdf-extract needs the decrypted bytes for its fallback pass.
            let mut decrypted = Vec::new();
            document
                .save_to(&mut decrypted)
                .map_err(|e| PdfError::Parse(format!("failed to save decrypted PDF: {}", e)))?;
            decrypted
        } else {
            data.to_vec()
        };

        let page_count = document.get_pages().len();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        debug!("Loaded PDF with {} pages", page_count);
        Ok(Self {
            document,
            raw_data,
            detector: StreamTableDetector::new(),
        })
    }

    /// Use a differently configured table detector.
    pub fn with_detector(mut self, detector: StreamTableDetector) -> Self {
        self.detector = detector;
        self
    }

    /// Number of pages.
    pub fn page_count(&self) -> u32 {
        self.document.get_pages().len() as u32
    }

    /// Text of one page (1-indexed).
    pub fn page_text(&self, page: u32) -> Result<String> {
        if page == 0 || page > self.page_count() {
            return Err(PdfError::InvalidPage(page));
        }

        self.document
            .extract_text(&[page])
            .map_err(|e| PdfError::TextExtraction(e.to_string()))
    }

    /// Per-page texts; pages lopdf cannot decode come back empty.
    ///
    /// When no page yields text the whole document is run through
    /// pdf-extract and returned as a single page. If that fails too the
    /// empty pages are returned, leaving the caller to report a document
    /// without text or tables.
    pub fn page_texts(&self) -> Vec<String> {
        let pages: Vec<String> = (1..=self.page_count())
            .map(|page| {
                self.page_text(page).unwrap_or_else(|e| {
                    warn!("No text on page {}: {}", page, e);
                    String::new()
                })
            })
            .collect();

        if pages.iter().any(|text| !text.trim().is_empty()) {
            return pages;
        }

        debug!("lopdf found no text, falling back to pdf-extract");
        match pdf_extract::extract_text_from_mem(&self.raw_data) {
            Ok(text) => vec![text],
            Err(e) => {
                warn!("pdf-extract fallback failed: {}", e);
                pages
            }
        }
    }
}

impl DocumentSource for PdfSource {
    fn text(&self) -> Result<String> {
        let text = self.page_texts().join("\n");
        debug!("Extracted {} characters of text", text.len());
        Ok(text)
    }

    fn tables(&self) -> Result<Vec<RawTable>> {
        let pages = self.page_texts();
        Ok(self.detector.detect_pages(pages.iter().map(String::as_str)))
    }
}

/// Plain text standing in for a document, pages separated by form feeds.
#[derive(Debug, Clone, Default)]
pub struct TextSource {
    text: String,
    detector: StreamTableDetector,
}

impl TextSource {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            detector: StreamTableDetector::new(),
        }
    }

    pub fn with_detector(mut self, detector: StreamTableDetector) -> Self {
        self.detector = detector;
        self
    }
}

impl DocumentSource for TextSource {
    fn text(&self) -> Result<String> {
        Ok(self.text.split('\u{000c}').collect::<Vec<_>>().join("\n"))
    }

    fn tables(&self) -> Result<Vec<RawTable>> {
        Ok(self.detector.detect_pages(self.text.split('\u{000c}')))
    }
}
