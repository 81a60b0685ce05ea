//! Per-page orchestration: render, recognize, map, materialize.
//!
//! [`PageAssembler`] drives one document through the collaborators:
//!
//! 1. open the document ([`PageRasterizer`]), fatal on failure
//! 2. for each selected page, render it ([`RasterDocument`]), fatal on failure
//! 3. write the image to a scratch directory and run OCR ([`WordSource`])
//! 4. map the words into a grid ([`GridMapper`])
//! 5. write the grid as a sheet ([`WorkbookSink`]), fatal on failure
//!
//! Steps 3 and 4 are page-scoped: a failure there skips the page, is logged
//! and recorded in the [`ConversionReport`], and the next page proceeds.
//! So is a grid too large for one sheet of the sink, which is checked before
//! step 5 creates anything.
//! The open document and the scratch directory are released on every exit
//! path when they go out of scope.

use std::path::Path;

use image::DynamicImage;
use scansheet_core::{GridMapper, GridOptions, PageGrid, Word};
use tracing::{debug, info, warn};

use crate::config::ConvertOptions;
use crate::error::{BackendError, ConvertError};
use crate::report::{ConversionReport, PageFailure, SheetSummary, sheet_label};
use crate::sink::WorkbookSink;
use crate::source::{PageImage, PageRasterizer, RasterDocument, WordSource};

/// A page that made it through OCR and grid mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct MappedPage {
    /// 0-indexed page number in the source document.
    pub index: usize,
    /// Words as returned by the word source (input order).
    pub words: Vec<Word>,
    /// The reconstructed grid.
    pub grid: PageGrid,
}

impl MappedPage {
    /// 1-indexed page number.
    pub fn page_number(&self) -> usize {
        self.index + 1
    }
}

/// Result of [`PageAssembler::extract`]: mapped pages without a workbook.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractOutput {
    /// Pages in the source document.
    pub page_count: usize,
    /// Successfully mapped pages, in page order.
    pub pages: Vec<MappedPage>,
    /// Pages skipped, in page order.
    pub failures: Vec<PageFailure>,
}

/// Converts documents page by page using the given collaborators.
///
/// # Example
///
/// ```ignore
/// let assembler = PageAssembler::new(ConvertOptions::default(), &rasterizer, &ocr);
/// let mut sink = XlsxSink::new();
/// let report = assembler.convert(Path::new("scan.pdf"), &mut sink)?;
/// sink.save(Path::new("scan.xlsx"))?;
/// ```
pub struct PageAssembler<'a> {
    options: ConvertOptions,
    rasterizer: &'a dyn PageRasterizer,
    words: &'a dyn WordSource,
    progress: Option<&'a dyn Fn(usize, usize)>,
}

impl<'a> PageAssembler<'a> {
    pub fn new(
        options: ConvertOptions,
        rasterizer: &'a dyn PageRasterizer,
        words: &'a dyn WordSource,
    ) -> Self {
        Self {
            options,
            rasterizer,
            words,
            progress: None,
        }
    }

    /// Call `progress(current, total)` before each page is rendered.
    /// `current` is 1-based and counts selected pages, not page numbers.
    pub fn with_progress(mut self, progress: &'a dyn Fn(usize, usize)) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Convert the document at `input`, writing one sheet per page into `sink`.
    ///
    /// Sheets are created in page order and labeled `"Page {n}"`. The sink is
    /// not saved; call [`WorkbookSink::save`] afterwards.
    pub fn convert(
        &self,
        input: &Path,
        sink: &mut dyn WorkbookSink,
    ) -> Result<ConversionReport, ConvertError> {
        let mut report = ConversionReport::default();
        let mut sheets = Vec::new();
        let mut failures = Vec::new();

        report.page_count = self.run(input, &mut |outcome| {
            match outcome {
                Ok(page) => match materialize(sink, &page) {
                    Ok(sheet) => sheets.push(sheet),
                    Err(err) => failures.push(skip_page(err)?),
                },
                Err(failure) => failures.push(failure),
            }
            Ok(())
        })?;

        report.sheets = sheets;
        report.failures = failures;
        info!(
            sheets = report.sheets.len(),
            skipped = report.failures.len(),
            "conversion finished"
        );
        Ok(report)
    }

    /// Run OCR and grid mapping on every selected page without writing a workbook.
    pub fn extract(&self, input: &Path) -> Result<ExtractOutput, ConvertError> {
        let mut pages = Vec::new();
        let mut failures = Vec::new();

        let page_count = self.run(input, &mut |outcome| {
            match outcome {
                Ok(page) => pages.push(page),
                Err(failure) => failures.push(failure),
            }
            Ok(())
        })?;

        Ok(ExtractOutput {
            page_count,
            pages,
            failures,
        })
    }

    /// Drive every selected page through render + recognize and hand each
    /// outcome to `emit` in page order. Returns the document's page count.
    fn run(
        &self,
        input: &Path,
        emit: &mut dyn FnMut(Result<MappedPage, PageFailure>) -> Result<(), ConvertError>,
    ) -> Result<usize, ConvertError> {
        self.options.validate()?;

        let document =
            self.rasterizer
                .open(input)
                .map_err(|e| ConvertError::DocumentLoad {
                    path: input.to_path_buf(),
                    message: e.to_string(),
                })?;
        let page_count = document.page_count();
        let indices = self.options.pages.resolve(page_count)?;

        let scratch = tempfile::Builder::new()
            .prefix("scansheet_pages_")
            .tempdir()
            .map_err(|e| {
                ConvertError::Configuration(format!("failed to create scratch directory: {e}"))
            })?;
        debug!(
            path = %scratch.path().display(),
            pages = indices.len(),
            page_count,
            "opened document"
        );

        #[cfg(feature = "parallel")]
        self.run_batched(document.as_ref(), &indices, scratch.path(), emit)?;
        #[cfg(not(feature = "parallel"))]
        self.run_sequential(document.as_ref(), &indices, scratch.path(), emit)?;

        Ok(page_count)
    }

    #[cfg_attr(feature = "parallel", allow(dead_code))]
    fn run_sequential(
        &self,
        document: &dyn RasterDocument,
        indices: &[usize],
        scratch: &Path,
        emit: &mut dyn FnMut(Result<MappedPage, PageFailure>) -> Result<(), ConvertError>,
    ) -> Result<(), ConvertError> {
        for (position, &index) in indices.iter().enumerate() {
            self.report_progress(position + 1, indices.len());
            let image = self.render(document, index)?;
            let outcome = recognize(self.words, &self.options.grid, index, image, scratch);
            dispatch(outcome, emit)?;
        }
        Ok(())
    }

    /// Render a batch of pages on this thread, then recognize and map the
    /// batch on the rayon pool. Outcomes are emitted in page order.
    #[cfg(feature = "parallel")]
    fn run_batched(
        &self,
        document: &dyn RasterDocument,
        indices: &[usize],
        scratch: &Path,
        emit: &mut dyn FnMut(Result<MappedPage, PageFailure>) -> Result<(), ConvertError>,
    ) -> Result<(), ConvertError> {
        use rayon::prelude::*;

        let batch_size = rayon::current_num_threads().max(1);
        let words = self.words;
        let grid = &self.options.grid;
        let mut position = 0;

        for batch in indices.chunks(batch_size) {
            let mut images = Vec::with_capacity(batch.len());
            for &index in batch {
                position += 1;
                self.report_progress(position, indices.len());
                images.push((index, self.render(document, index)?));
            }

            let outcomes: Vec<_> = images
                .into_par_iter()
                .map(|(index, image)| recognize(words, grid, index, image, scratch))
                .collect();

            for outcome in outcomes {
                dispatch(outcome, emit)?;
            }
        }
        Ok(())
    }

    fn render(
        &self,
        document: &dyn RasterDocument,
        index: usize,
    ) -> Result<DynamicImage, ConvertError> {
        info!(page = index + 1, "rendering page");
        document
            .render_page(index, self.options.dpi)
            .map_err(|e| ConvertError::PageRender {
                page: index + 1,
                message: e.to_string(),
            })
    }

    fn report_progress(&self, current: usize, total: usize) {
        if let Some(progress) = self.progress {
            progress(current, total);
        }
    }
}

/// OCR one rendered page and map its words. Errors are page-scoped.
fn recognize(
    ocr: &dyn WordSource,
    grid: &GridOptions,
    index: usize,
    image: DynamicImage,
    scratch: &Path,
) -> Result<MappedPage, ConvertError> {
    let page = index + 1;
    let path = scratch.join(format!("page_{page}.png"));
    image.save(&path).map_err(|e| ConvertError::PageOcr {
        page,
        message: format!("failed to write {}: {e}", path.display()),
    })?;

    let page_image = PageImage { index, image, path };
    let words = ocr
        .extract_words(&page_image)
        .map_err(|e| ConvertError::PageOcr {
            page,
            message: e.to_string(),
        })?;
    debug!(page, words = words.len(), "OCR completed");

    let grid =
        GridMapper::map(&words, grid).map_err(|source| ConvertError::InvalidWord { page, source })?;
    debug!(
        page,
        cells = grid.len(),
        max_row = ?grid.max_row(),
        max_column = ?grid.max_column(),
        "grid mapped"
    );

    Ok(MappedPage { index, words, grid })
}

/// Forward a page outcome, downgrading page-scoped errors to failures.
fn dispatch(
    outcome: Result<MappedPage, ConvertError>,
    emit: &mut dyn FnMut(Result<MappedPage, PageFailure>) -> Result<(), ConvertError>,
) -> Result<(), ConvertError> {
    match outcome {
        Ok(page) => emit(Ok(page)),
        Err(err) => emit(Err(skip_page(err)?)),
    }
}

/// Turn a page-scoped error into a report entry; fatal errors pass through.
fn skip_page(err: ConvertError) -> Result<PageFailure, ConvertError> {
    if !err.is_page_scoped() {
        return Err(err);
    }
    match PageFailure::from_error(&err) {
        Some(failure) => {
            warn!(page = failure.page, kind = %failure.kind, "skipping page: {err}");
            Ok(failure)
        }
        None => Err(err),
    }
}

/// Write a mapped page as a dense sheet and size its columns.
///
/// An empty page still gets a sheet, with no cells written. A grid beyond
/// [`WorkbookSink::max_extent`] fails with the page-scoped
/// [`ConvertError::SheetTooLarge`] before any sheet is created.
fn materialize(
    sink: &mut dyn WorkbookSink,
    page: &MappedPage,
) -> Result<SheetSummary, ConvertError> {
    if let (Some(extent), Some(limit)) = (page.grid.extent(), sink.max_extent()) {
        if extent.max_row > limit.max_row || extent.max_column > limit.max_column {
            return Err(ConvertError::SheetTooLarge {
                page: page.page_number(),
                rows: extent.row_count(),
                columns: extent.column_count(),
                max_rows: limit.row_count(),
                max_columns: limit.column_count(),
            });
        }
    }

    let label = sheet_label(page.page_number());
    let sheet = sink.create_sheet(&label).map_err(sink_error)?;

    if let Some(extent) = page.grid.extent() {
        for row in 0..=extent.max_row {
            for column in 0..=extent.max_column {
                let text = page.grid.get(row, column).unwrap_or_default();
                sink.set_cell(sheet, row, column, text).map_err(sink_error)?;
            }
        }
        for column in 0..=extent.max_column {
            sink.auto_size_column(sheet, column).map_err(sink_error)?;
        }
    }

    Ok(SheetSummary::new(
        page.page_number(),
        label,
        &page.grid,
        page.words.len(),
    ))
}

fn sink_error(err: BackendError) -> ConvertError {
    ConvertError::SinkWrite(err.to_string())
}
