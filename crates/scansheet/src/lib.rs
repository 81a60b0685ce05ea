//! scansheet: Convert scanned PDF documents into spreadsheets.
//!
//! Each page is rendered to an image, run through OCR, and the recognized
//! words are placed into a row/column grid by quantizing their pixel
//! positions. Every page becomes one sheet of the output workbook.
//!
//! # Architecture
//!
//! - **scansheet-core**: Backend-independent data types and the grid mapper
//! - **scansheet** (this crate): Page assembly plus the rasterizer, OCR and
//!   workbook backends
//!
//! The [`PageAssembler`] only talks to the [`PageRasterizer`], [`WordSource`]
//! and [`WorkbookSink`] traits. The bundled backends are:
//!
//! | Trait | Backend | Feature |
//! |-------|---------|---------|
//! | [`PageRasterizer`] | `PdfiumRasterizer` | `pdfium` (default) |
//! | [`WordSource`] | [`TesseractCli`] | always |
//! | [`WordSource`] | `LeptessWordSource` | `leptess` |
//! | [`WorkbookSink`] | `XlsxSink` | `xlsx` (default) |

pub use scansheet_core;

mod assembler;
mod config;
mod error;
mod report;
mod sink;
mod source;
mod tesseract;

#[cfg(feature = "leptess")]
mod leptess_ocr;
#[cfg(feature = "pdfium")]
mod pdfium;
#[cfg(feature = "xlsx")]
mod xlsx;

pub use assembler::{ExtractOutput, MappedPage, PageAssembler};
pub use config::{ConvertOptions, DEFAULT_DPI, OcrOptions, PageRange};
pub use error::{BackendError, ConvertError};
pub use report::{ConversionReport, FailureKind, PageFailure, SheetSummary, sheet_label};
pub use sink::{SheetId, WorkbookSink};
pub use source::{PageImage, PageRasterizer, RasterDocument, WordSource};
pub use tesseract::{TesseractCli, parse_tsv};

#[cfg(feature = "leptess")]
pub use leptess_ocr::LeptessWordSource;
#[cfg(feature = "pdfium")]
pub use pdfium::PdfiumRasterizer;
#[cfg(feature = "xlsx")]
pub use xlsx::XlsxSink;

pub use scansheet_core::{
    BBox, GridCoordinate, GridError, GridExtent, GridMapper, GridOptions, PageGrid, TextNorm,
    Word,
};

#[cfg(all(feature = "pdfium", feature = "xlsx"))]
use std::path::Path;

/// Convert `input` to an `.xlsx` workbook at `output` using PDFium and the
/// `tesseract` executable.
///
/// OCR settings are checked before the document is opened. The workbook is
/// only written if the run completes; skipped pages are listed in the
/// returned report.
#[cfg(all(feature = "pdfium", feature = "xlsx"))]
pub fn convert_file(
    input: &Path,
    output: &Path,
    options: &ConvertOptions,
    ocr: &OcrOptions,
) -> Result<ConversionReport, ConvertError> {
    options.validate()?;
    let words = TesseractCli::new(ocr.clone())?;
    let rasterizer = PdfiumRasterizer::new()?;

    let mut sink = XlsxSink::new();
    let report = PageAssembler::new(options.clone(), &rasterizer, &words).convert(input, &mut sink)?;
    sink.save(output)?;
    Ok(report)
}
