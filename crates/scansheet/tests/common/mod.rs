//! In-memory collaborators for driving the page assembler in tests.

#![allow(dead_code)]

use std::cell::Cell;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use image::{DynamicImage, Rgb, RgbImage};
use scansheet::{
    BBox, BackendError, GridExtent, PageImage, PageRasterizer, RasterDocument, SheetId, Word,
    WordSource, WorkbookSink,
};

/// Shorthand for a word at pixel position (x, y).
pub fn word(text: &str, x: f64, y: f64) -> Word {
    Word::new(text, BBox::new(x, y, 30.0, 12.0))
}

/// Rasterizer over a fixed number of blank pages.
pub struct ScriptedRasterizer {
    page_count: usize,
    open_error: Option<String>,
    render_errors: HashMap<usize, String>,
    pub opened: Cell<usize>,
    pub closed: Cell<usize>,
    pub rendered: Mutex<Vec<usize>>,
}

impl ScriptedRasterizer {
    pub fn with_pages(page_count: usize) -> Self {
        Self {
            page_count,
            open_error: None,
            render_errors: HashMap::new(),
            opened: Cell::new(0),
            closed: Cell::new(0),
            rendered: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_open(message: &str) -> Self {
        Self {
            open_error: Some(message.to_string()),
            ..Self::with_pages(0)
        }
    }

    /// Make rendering the 0-indexed page `index` fail.
    pub fn fail_render(mut self, index: usize, message: &str) -> Self {
        self.render_errors.insert(index, message.to_string());
        self
    }

    pub fn rendered(&self) -> Vec<usize> {
        self.rendered.lock().unwrap().clone()
    }
}

impl PageRasterizer for ScriptedRasterizer {
    fn open<'a>(&'a self, _path: &Path) -> Result<Box<dyn RasterDocument + 'a>, BackendError> {
        if let Some(message) = &self.open_error {
            return Err(BackendError::Render(message.clone()));
        }
        self.opened.set(self.opened.get() + 1);
        Ok(Box::new(ScriptedDocument { rasterizer: self }))
    }
}

struct ScriptedDocument<'a> {
    rasterizer: &'a ScriptedRasterizer,
}

impl RasterDocument for ScriptedDocument<'_> {
    fn page_count(&self) -> usize {
        self.rasterizer.page_count
    }

    fn render_page(&self, index: usize, _dpi: f32) -> Result<DynamicImage, BackendError> {
        self.rasterizer.rendered.lock().unwrap().push(index);
        if let Some(message) = self.rasterizer.render_errors.get(&index) {
            return Err(BackendError::Render(message.clone()));
        }
        Ok(DynamicImage::ImageRgb8(RgbImage::from_pixel(
            8,
            8,
            Rgb([255, 255, 255]),
        )))
    }
}

impl Drop for ScriptedDocument<'_> {
    fn drop(&mut self) {
        self.rasterizer.closed.set(self.rasterizer.closed.get() + 1);
    }
}

/// Word source returning canned words per 0-indexed page.
///
/// Pages without a script yield no words.
#[derive(Default)]
pub struct ScriptedWords {
    pages: HashMap<usize, Result<Vec<Word>, String>>,
    /// Every image path handed to the source, and whether it existed then.
    pub seen: Mutex<Vec<(usize, PathBuf, bool)>>,
}

impl ScriptedWords {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, index: usize, words: Vec<Word>) -> Self {
        self.pages.insert(index, Ok(words));
        self
    }

    pub fn failing(mut self, index: usize, message: &str) -> Self {
        self.pages.insert(index, Err(message.to_string()));
        self
    }

    /// 0-indexed pages OCR was run on, sorted.
    pub fn recognized(&self) -> Vec<usize> {
        let mut pages: Vec<usize> = self.seen.lock().unwrap().iter().map(|s| s.0).collect();
        pages.sort_unstable();
        pages
    }
}

impl WordSource for ScriptedWords {
    fn extract_words(&self, page: &PageImage) -> Result<Vec<Word>, BackendError> {
        self.seen
            .lock()
            .unwrap()
            .push((page.index, page.path.clone(), page.path.is_file()));
        match self.pages.get(&page.index) {
            Some(Ok(words)) => Ok(words.clone()),
            Some(Err(message)) => Err(BackendError::Ocr(message.clone())),
            None => Ok(Vec::new()),
        }
    }
}

/// A sheet as the recording sink saw it.
#[derive(Debug, Default)]
pub struct RecordedSheet {
    pub label: String,
    /// Every `set_cell` call, including empty text.
    pub cells: BTreeMap<(u32, u32), String>,
    pub auto_sized: Vec<u32>,
}

impl RecordedSheet {
    pub fn text(&self, row: u32, column: u32) -> Option<&str> {
        self.cells.get(&(row, column)).map(String::as_str)
    }

    /// Cells with non-empty text.
    pub fn filled(&self) -> Vec<((u32, u32), &str)> {
        self.cells
            .iter()
            .filter(|(_, text)| !text.is_empty())
            .map(|(pos, text)| (*pos, text.as_str()))
            .collect()
    }
}

/// Sink that records every call.
#[derive(Default)]
pub struct RecordingSink {
    pub sheets: Vec<RecordedSheet>,
    pub saved: Option<PathBuf>,
    fail_on_label: Option<String>,
    max_extent: Option<GridExtent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make creating the sheet named `label` fail.
    pub fn failing_on(label: &str) -> Self {
        Self {
            fail_on_label: Some(label.to_string()),
            ..Self::default()
        }
    }

    /// Limit sheets to `rows x columns` cells.
    pub fn bounded(rows: u32, columns: u32) -> Self {
        Self {
            max_extent: Some(GridExtent {
                max_row: rows - 1,
                max_column: columns - 1,
            }),
            ..Self::default()
        }
    }

    pub fn labels(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.label.as_str()).collect()
    }
}

impl WorkbookSink for RecordingSink {
    fn max_extent(&self) -> Option<GridExtent> {
        self.max_extent
    }

    fn create_sheet(&mut self, label: &str) -> Result<SheetId, BackendError> {
        if self.fail_on_label.as_deref() == Some(label) {
            return Err(BackendError::Sink("disk full".to_string()));
        }
        self.sheets.push(RecordedSheet {
            label: label.to_string(),
            ..RecordedSheet::default()
        });
        Ok(SheetId(self.sheets.len() - 1))
    }

    fn set_cell(
        &mut self,
        sheet: SheetId,
        row: u32,
        column: u32,
        text: &str,
    ) -> Result<(), BackendError> {
        let sheet = &mut self.sheets[sheet.0];
        let previous = sheet.cells.insert((row, column), text.to_string());
        assert!(previous.is_none(), "cell ({row}, {column}) written twice");
        Ok(())
    }

    fn auto_size_column(&mut self, sheet: SheetId, column: u32) -> Result<(), BackendError> {
        self.sheets[sheet.0].auto_sized.push(column);
        Ok(())
    }

    fn save(&mut self, path: &Path) -> Result<(), BackendError> {
        self.saved = Some(path.to_path_buf());
        Ok(())
    }
}
