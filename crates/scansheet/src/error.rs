//! Error types for the conversion pipeline.
//!
//! Uses [`thiserror`] for ergonomic error derivation. Collaborator
//! implementations (rasterizers, word sources, sinks) return
//! [`BackendError`]; the page assembler wraps those into [`ConvertError`]
//! with page context and decides which ones are fatal.

use std::path::PathBuf;

use scansheet_core::GridError;
use thiserror::Error;

use crate::report::FailureKind;

/// Error returned by a collaborator backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The document could not be opened or a page could not be rendered.
    #[error("render error: {0}")]
    Render(String),

    /// The OCR engine failed on an image.
    #[error("OCR error: {0}")]
    Ocr(String),

    /// The workbook rejected a write or could not be saved.
    #[error("workbook error: {0}")]
    Sink(String),

    /// The backend is missing a native library, binary or data file.
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    /// Error reading or writing a file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error raised while converting a document.
///
/// Page-scoped variants ([`PageOcr`](ConvertError::PageOcr),
/// [`InvalidWord`](ConvertError::InvalidWord),
/// [`SheetTooLarge`](ConvertError::SheetTooLarge)) are caught by the page
/// assembler, recorded in the report and never returned from a conversion.
/// Every other variant aborts the run.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// OCR data, engine binary or rasterizer library is missing or misconfigured.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The input document cannot be opened or parsed.
    #[error("failed to open {}: {message}", path.display())]
    DocumentLoad { path: PathBuf, message: String },

    /// A page could not be rasterized (1-indexed page number).
    #[error("failed to render page {page}: {message}")]
    PageRender { page: usize, message: String },

    /// OCR failed for a page (1-indexed page number).
    #[error("OCR failed on page {page}: {message}")]
    PageOcr { page: usize, message: String },

    /// The word source produced a malformed word for a page.
    #[error("page {page}: {source}")]
    InvalidWord {
        page: usize,
        #[source]
        source: GridError,
    },

    /// A page's grid does not fit in one sheet of the workbook.
    #[error(
        "page {page}: grid of {rows} rows x {columns} columns exceeds the sheet limit \
         of {max_rows} rows x {max_columns} columns"
    )]
    SheetTooLarge {
        page: usize,
        rows: usize,
        columns: usize,
        max_rows: usize,
        max_columns: usize,
    },

    /// A `--pages` style range is malformed or out of bounds.
    #[error("invalid page range: {0}")]
    InvalidPageRange(String),

    /// The workbook could not be written.
    #[error("failed to write workbook: {0}")]
    SinkWrite(String),
}

impl ConvertError {
    /// Returns true for errors confined to one page (skip the page, continue).
    pub fn is_page_scoped(&self) -> bool {
        self.failure_kind().is_some()
    }

    /// Report category of a page-scoped error, `None` for fatal ones.
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            ConvertError::PageOcr { .. } => Some(FailureKind::Ocr),
            ConvertError::InvalidWord { .. } => Some(FailureKind::InvalidWord),
            ConvertError::SheetTooLarge { .. } => Some(FailureKind::SheetTooLarge),
            _ => None,
        }
    }

    /// 1-indexed page number the error refers to, if any.
    pub fn page(&self) -> Option<usize> {
        match self {
            ConvertError::PageRender { page, .. }
            | ConvertError::PageOcr { page, .. }
            | ConvertError::InvalidWord { page, .. }
            | ConvertError::SheetTooLarge { page, .. } => Some(*page),
            _ => None,
        }
    }
}

impl From<BackendError> for ConvertError {
    /// Backend errors outside a page context; unavailable backends are
    /// configuration problems, everything else a workbook failure.
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Unavailable(msg) => ConvertError::Configuration(msg),
            other => ConvertError::SinkWrite(other.to_string()),
        }
    }
}
