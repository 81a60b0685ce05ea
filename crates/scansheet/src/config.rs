//! Conversion settings.
//!
//! All settings are plain values handed to the page assembler and the
//! backends at construction. Nothing here is global, so several conversions
//! with different settings can run in one process.

use std::path::PathBuf;

use scansheet_core::GridOptions;

use crate::error::ConvertError;

/// Resolution pages are rendered at before OCR.
pub const DEFAULT_DPI: f32 = 300.0;

/// Options for a conversion run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConvertOptions {
    /// Rasterization resolution in dots per inch (default: 300).
    pub dpi: f32,
    /// Pixel-to-grid ratios and text normalization.
    pub grid: GridOptions,
    /// Pages to convert (default: all).
    pub pages: PageRange,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            dpi: DEFAULT_DPI,
            grid: GridOptions::default(),
            pages: PageRange::All,
        }
    }
}

impl ConvertOptions {
    /// Reject settings no page could be converted with.
    pub fn validate(&self) -> Result<(), ConvertError> {
        if !self.dpi.is_finite() || self.dpi <= 0.0 {
            return Err(ConvertError::Configuration(format!(
                "dpi must be a positive number (got {})",
                self.dpi
            )));
        }
        self.grid
            .validate()
            .map_err(|e| ConvertError::Configuration(e.to_string()))
    }
}

/// Options for the Tesseract-backed word sources.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OcrOptions {
    /// Tesseract language code(s), e.g. `"eng"` or `"eng+deu"`.
    pub language: String,
    /// Directory holding `*.traineddata`. `None` lets Tesseract use its own default.
    pub tessdata_dir: Option<PathBuf>,
    /// Tesseract page segmentation mode (default: 3, fully automatic).
    pub page_segmentation_mode: u32,
    /// Name or path of the `tesseract` executable.
    pub binary: PathBuf,
}

impl Default for OcrOptions {
    fn default() -> Self {
        Self {
            language: "eng".to_string(),
            tessdata_dir: None,
            page_segmentation_mode: 3,
            binary: PathBuf::from("tesseract"),
        }
    }
}

impl OcrOptions {
    /// Check the OCR data directory before any page is processed.
    pub fn validate(&self) -> Result<(), ConvertError> {
        if self.language.trim().is_empty() {
            return Err(ConvertError::Configuration(
                "OCR language must not be empty".to_string(),
            ));
        }
        if let Some(dir) = &self.tessdata_dir {
            if !dir.is_dir() {
                return Err(ConvertError::Configuration(format!(
                    "tessdata directory not found or not a directory: {}",
                    dir.display()
                )));
            }
        }
        Ok(())
    }
}

/// A selection of pages, written 1-indexed as `"1,3-5"`.
///
/// Parsing only checks syntax; bounds are checked by [`resolve`](PageRange::resolve)
/// once the document's page count is known.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PageRange {
    /// Every page, in document order.
    #[default]
    All,
    /// Inclusive 1-indexed spans.
    Spans(Vec<(usize, usize)>),
}

impl PageRange {
    /// Parse a range string like `"1,3-5"`.
    ///
    /// Page 0, reversed spans and non-numeric parts are rejected.
    pub fn parse(input: &str) -> Result<Self, ConvertError> {
        let mut spans = Vec::new();

        for part in input.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }

            let (start, end) = match part.split_once('-') {
                Some((start, end)) => (parse_page(start)?, parse_page(end)?),
                None => {
                    let page = parse_page(part)?;
                    (page, page)
                }
            };
            if start > end {
                return Err(ConvertError::InvalidPageRange(format!(
                    "range '{part}' ends before it starts"
                )));
            }
            spans.push((start, end));
        }

        if spans.is_empty() {
            return Err(ConvertError::InvalidPageRange(format!(
                "no pages in '{input}'"
            )));
        }
        Ok(PageRange::Spans(spans))
    }

    /// Resolve into sorted, de-duplicated 0-indexed page indices.
    pub fn resolve(&self, page_count: usize) -> Result<Vec<usize>, ConvertError> {
        let spans = match self {
            PageRange::All => return Ok((0..page_count).collect()),
            PageRange::Spans(spans) => spans,
        };

        let mut pages = Vec::new();
        for &(start, end) in spans {
            if end > page_count {
                return Err(ConvertError::InvalidPageRange(format!(
                    "page {end} exceeds document page count ({page_count})"
                )));
            }
            pages.extend((start..=end).map(|p| p - 1));
        }

        pages.sort_unstable();
        pages.dedup();
        Ok(pages)
    }
}

fn parse_page(s: &str) -> Result<usize, ConvertError> {
    let s = s.trim();
    let page: usize = s
        .parse()
        .map_err(|_| ConvertError::InvalidPageRange(format!("invalid page number: '{s}'")))?;
    if page == 0 {
        return Err(ConvertError::InvalidPageRange(
            "page 0 is invalid (pages start at 1)".to_string(),
        ));
    }
    Ok(page)
}
