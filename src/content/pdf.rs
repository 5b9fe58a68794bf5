//! PDF to Markdown conversion handler.
//!
//! Uses `pdfium-render` (Chromium's PDF library) to read the positioned
//! text segments of every page, then hands them to [`super::layout`] for
//! line grouping and heading/list classification.
//!
//! # Pipeline
//!
//! ```text
//! PDF bytes → pdfium text segments → line grouping → line classification → pages joined by `---`
//! ```
//!
//! Corrupt or encrypted documents fail at load time. There is no partial
//! page recovery and no OCR for image-only pages.

use std::time::Instant;

use pdfium_render::prelude::*;
use tracing::{debug, instrument};

use super::layout::{join_pages, page_to_markdown, TextRun};
use super::{Converter, ConversionResult};
use crate::config::PdfOptions;
use crate::error::{ConvertError, Result};

/// Converts PDF documents to Markdown with heuristic structure recovery.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfConverter {
    options: PdfOptions,
}

impl PdfConverter {
    pub fn new(options: PdfOptions) -> Self {
        Self { options }
    }

    /// Bind pdfium from the working directory first, then the system.
    fn bind() -> Result<Pdfium> {
        let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library())
            .map_err(|e| ConvertError::Pdf(format!("pdfium library not available: {e}")))?;
        Ok(Pdfium::new(bindings))
    }

    /// Read every page's text segments as runs, in content-stream order.
    #[allow(deprecated)] // PdfRect field access deprecated in 0.8.28, removed in 0.9.0
    fn extract_pages(bytes: &[u8]) -> Result<Vec<Vec<TextRun>>> {
        let pdfium = Self::bind()?;
        let document = pdfium
            .load_pdf_from_byte_slice(bytes, None)
            .map_err(|e| ConvertError::Pdf(format!("failed to load PDF: {e}")))?;

        let mut pages = Vec::with_capacity(document.pages().len() as usize);
        for (page_idx, page) in document.pages().iter().enumerate() {
            let text = page
                .text()
                .map_err(|e| ConvertError::Pdf(format!("page {}: {e}", page_idx + 1)))?;
            let runs: Vec<TextRun> = text
                .segments()
                .iter()
                .map(|segment| {
                    let rect = segment.bounds();
                    TextRun::new(segment.text(), rect.left.value, rect.bottom.value)
                })
                .collect();
            debug!(page = page_idx + 1, runs = runs.len(), "extracted page text");
            pages.push(runs);
        }

        Ok(pages)
    }

    /// Convert PDF bytes to Markdown.
    #[instrument(skip_all, fields(bytes = bytes.len()))]
    pub fn convert(&self, bytes: &[u8]) -> Result<(String, usize)> {
        let pages = Self::extract_pages(bytes)?;
        let rendered: Vec<String> = pages
            .iter()
            .map(|runs| page_to_markdown(runs, self.options.line_tolerance))
            .collect();
        Ok((join_pages(&rendered), pages.len()))
    }
}

impl Converter for PdfConverter {
    fn name(&self) -> &'static str {
        "pdf"
    }

    fn matches(&self, extension: &str) -> bool {
        extension.contains("pdf")
    }

    fn to_markdown(&self, bytes: &[u8]) -> Result<ConversionResult> {
        let start = Instant::now();
        let (markdown, page_count) = self.convert(bytes)?;

        Ok(ConversionResult {
            markdown,
            converter: self.name().to_string(),
            page_count: Some(page_count),
            elapsed_ms: start.elapsed().as_secs_f64() * 1000.0,
        })
    }
}
