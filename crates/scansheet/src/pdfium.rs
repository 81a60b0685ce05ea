//! Page rasterization through PDFium.
//!
//! The PDFium shared library is bound at runtime: first from the working
//! directory, then from the system library path.

use std::path::Path;

use image::{DynamicImage, RgbaImage};
use pdfium_render::prelude::*;
use tracing::debug;

use crate::error::BackendError;
use crate::source::{PageRasterizer, RasterDocument};

/// PDF points per inch.
const POINTS_PER_INCH: f32 = 72.0;

/// Renders PDF pages with a dynamically loaded PDFium.
pub struct PdfiumRasterizer {
    pdfium: Pdfium,
}

impl PdfiumRasterizer {
    /// Bind the PDFium library.
    ///
    /// Fails with [`BackendError::Unavailable`] if no library can be found.
    pub fn new() -> Result<Self, BackendError> {
        let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library())
            .map_err(|e| BackendError::Unavailable(format!("failed to bind PDFium: {e}")))?;
        Ok(Self {
            pdfium: Pdfium::new(bindings),
        })
    }
}

impl PageRasterizer for PdfiumRasterizer {
    fn open<'a>(&'a self, path: &Path) -> Result<Box<dyn RasterDocument + 'a>, BackendError> {
        if !path.is_file() {
            return Err(BackendError::Render(format!(
                "no such file: {}",
                path.display()
            )));
        }
        let document = self
            .pdfium
            .load_pdf_from_file(path, None)
            .map_err(|e| BackendError::Render(e.to_string()))?;
        debug!(path = %path.display(), pages = document.pages().len(), "loaded PDF");
        Ok(Box::new(PdfiumDocument { document }))
    }
}

struct PdfiumDocument<'a> {
    document: PdfDocument<'a>,
}

impl RasterDocument for PdfiumDocument<'_> {
    fn page_count(&self) -> usize {
        self.document.pages().len() as usize
    }

    fn render_page(&self, index: usize, dpi: f32) -> Result<DynamicImage, BackendError> {
        let page_index = u16::try_from(index)
            .map_err(|_| BackendError::Render(format!("page index {index} out of range")))?;
        let page = self
            .document
            .pages()
            .get(page_index)
            .map_err(|e| BackendError::Render(e.to_string()))?;

        let scale = dpi / POINTS_PER_INCH;
        let pixel_width = ((page.width().value * scale).round() as i32).max(1);
        let pixel_height = ((page.height().value * scale).round() as i32).max(1);

        let bitmap = page
            .render_with_config(
                &PdfRenderConfig::new()
                    .set_target_width(pixel_width)
                    .set_target_height(pixel_height)
                    .render_form_data(true)
                    .render_annotations(true),
            )
            .map_err(|e| BackendError::Render(e.to_string()))?;

        let rgba = RgbaImage::from_raw(
            bitmap.width() as u32,
            bitmap.height() as u32,
            bitmap.as_rgba_bytes(),
        )
        .ok_or_else(|| {
            BackendError::Render(format!(
                "PDFium returned a short bitmap for page {}",
                index + 1
            ))
        })?;
        Ok(DynamicImage::ImageRgba8(rgba))
    }
}
