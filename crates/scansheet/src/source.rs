//! Collaborator interfaces on the input side: page rasterization and OCR.
//!
//! The page assembler only sees these traits, so the grid pipeline can be
//! driven by any PDF renderer and any OCR engine, or by in-memory fakes.

use std::path::{Path, PathBuf};

use image::DynamicImage;
use scansheet_core::Word;

use crate::error::BackendError;

/// Opens documents for rendering.
pub trait PageRasterizer {
    /// Open the document at `path`.
    ///
    /// The returned handle owns the open document; dropping it closes the
    /// document.
    fn open<'a>(&'a self, path: &Path) -> Result<Box<dyn RasterDocument + 'a>, BackendError>;
}

/// An open document that can render its pages to pixels.
pub trait RasterDocument {
    /// Number of pages in the document.
    fn page_count(&self) -> usize;

    /// Render the 0-indexed page `index` at `dpi` dots per inch.
    fn render_page(&self, index: usize, dpi: f32) -> Result<DynamicImage, BackendError>;
}

/// A rendered page handed to a [`WordSource`].
#[derive(Debug)]
pub struct PageImage {
    /// 0-indexed page number in the source document.
    pub index: usize,
    /// The rendered pixels.
    pub image: DynamicImage,
    /// PNG copy of `image` in the conversion's scratch directory.
    pub path: PathBuf,
}

impl PageImage {
    /// 1-indexed page number, as shown to users.
    pub fn page_number(&self) -> usize {
        self.index + 1
    }
}

/// Extracts words and their pixel bounding boxes from a page image.
///
/// Failures are page-scoped: the assembler skips the page and continues.
/// Implementations must be shareable across threads so pages can be
/// recognized in parallel.
pub trait WordSource: Sync {
    fn extract_words(&self, page: &PageImage) -> Result<Vec<Word>, BackendError>;
}
