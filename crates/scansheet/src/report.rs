//! Outcome of a conversion run.
//!
//! A run that returns `Ok` may still have skipped pages; [`ConversionReport`]
//! pairs the sheets that were written with the page-level failures that were
//! recovered from.

use std::fmt;

use scansheet_core::PageGrid;

use crate::error::ConvertError;

/// Machine-readable category of a skipped page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FailureKind {
    /// The OCR engine failed on the page.
    Ocr,
    /// The OCR engine produced a word with an impossible bounding box.
    InvalidWord,
    /// The page's grid is larger than a sheet can hold.
    SheetTooLarge,
}

impl FailureKind {
    /// Returns the string tag for this failure kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Ocr => "OCR_FAILED",
            FailureKind::InvalidWord => "INVALID_WORD",
            FailureKind::SheetTooLarge => "SHEET_TOO_LARGE",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A page that was skipped.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PageFailure {
    /// 1-indexed page number.
    pub page: usize,
    pub kind: FailureKind,
    /// Human-readable description of the failure.
    pub message: String,
}

impl PageFailure {
    /// Build a failure record from a page-scoped error.
    ///
    /// Returns `None` for errors that are not page-scoped.
    pub fn from_error(err: &ConvertError) -> Option<Self> {
        let kind = err.failure_kind()?;
        let page = err.page()?;
        Some(Self {
            page,
            kind,
            message: err.to_string(),
        })
    }
}

impl fmt::Display for PageFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] page {}: {}", self.kind, self.page, self.message)
    }
}

/// A sheet that was written.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SheetSummary {
    /// 1-indexed source page number.
    pub page: usize,
    /// Sheet label, `"Page {page}"`.
    pub label: String,
    /// Rows in the dense sheet (0 for an empty page).
    pub rows: usize,
    /// Columns in the dense sheet (0 for an empty page).
    pub columns: usize,
    /// Occupied cells.
    pub cells: usize,
    /// Words recognized on the page.
    pub words: usize,
}

impl SheetSummary {
    pub(crate) fn new(page: usize, label: String, grid: &PageGrid, words: usize) -> Self {
        let (rows, columns) = grid
            .extent()
            .map_or((0, 0), |e| (e.row_count(), e.column_count()));
        Self {
            page,
            label,
            rows,
            columns,
            cells: grid.len(),
            words,
        }
    }
}

/// Result of converting one document.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConversionReport {
    /// Pages in the source document.
    pub page_count: usize,
    /// Sheets written, in page order.
    pub sheets: Vec<SheetSummary>,
    /// Pages skipped, in page order.
    pub failures: Vec<PageFailure>,
}

impl ConversionReport {
    /// Returns true if no page was skipped.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Labels of the written sheets, in order.
    pub fn sheet_labels(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.label.as_str()).collect()
    }
}

/// Label of the sheet for a 1-indexed page.
pub fn sheet_label(page: usize) -> String {
    format!("Page {page}")
}
