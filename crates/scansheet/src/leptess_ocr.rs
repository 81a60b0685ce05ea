//! In-process OCR through libtesseract.

use std::io::Cursor;

use leptess::{LepTess, Variable};
use scansheet_core::{BBox, Word};
use tracing::trace;

use crate::config::OcrOptions;
use crate::error::{BackendError, ConvertError};
use crate::source::{PageImage, WordSource};

/// Word source that links libtesseract instead of spawning a process.
///
/// A fresh engine is initialized per page, so one source can serve pages on
/// several threads.
#[derive(Debug, Clone)]
pub struct LeptessWordSource {
    options: OcrOptions,
}

impl LeptessWordSource {
    /// Validate `options` and check that the engine initializes with them.
    pub fn new(options: OcrOptions) -> Result<Self, ConvertError> {
        options.validate()?;
        let source = Self { options };
        source.engine().map_err(|e| {
            ConvertError::Configuration(format!(
                "failed to initialize Tesseract with language '{}': {e}",
                source.options.language
            ))
        })?;
        Ok(source)
    }

    fn engine(&self) -> Result<LepTess, BackendError> {
        let datapath = match &self.options.tessdata_dir {
            Some(dir) => Some(dir.to_str().ok_or_else(|| {
                BackendError::Unavailable(format!(
                    "tessdata path is not valid UTF-8: {}",
                    dir.display()
                ))
            })?),
            None => None,
        };
        let mut engine = LepTess::new(datapath, &self.options.language)
            .map_err(|e| BackendError::Unavailable(e.to_string()))?;
        engine
            .set_variable(
                Variable::TesseditPagesegMode,
                &self.options.page_segmentation_mode.to_string(),
            )
            .map_err(|e| BackendError::Ocr(format!("failed to set page segmentation mode: {e}")))?;
        Ok(engine)
    }
}

impl WordSource for LeptessWordSource {
    fn extract_words(&self, page: &PageImage) -> Result<Vec<Word>, BackendError> {
        let mut engine = self.engine()?;

        let mut png = Cursor::new(Vec::new());
        page.image
            .write_to(&mut png, image::ImageFormat::Png)
            .map_err(|e| BackendError::Ocr(format!("failed to encode page image: {e}")))?;
        engine
            .set_image_from_mem(png.get_ref())
            .map_err(|e| BackendError::Ocr(format!("failed to load page image: {e}")))?;

        // No boxes means no text on the page.
        let Some(boxes) =
            engine.get_component_boxes(leptess::capi::TessPageIteratorLevel_RIL_WORD, true)
        else {
            return Ok(Vec::new());
        };

        let mut words = Vec::new();
        for bbox in &boxes {
            let geom = bbox.get_geometry();
            engine.set_rectangle(geom.x, geom.y, geom.w, geom.h);
            let text = engine.get_utf8_text().unwrap_or_default();
            let text = text.trim();
            if text.is_empty() {
                continue;
            }
            trace!(page = page.page_number(), text, x = geom.x, y = geom.y, "word");
            words.push(Word::new(
                text,
                BBox::new(
                    f64::from(geom.x),
                    f64::from(geom.y),
                    f64::from(geom.w),
                    f64::from(geom.h),
                ),
            ));
        }
        Ok(words)
    }
}
