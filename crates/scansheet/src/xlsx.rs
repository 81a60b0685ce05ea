//! Workbook output as `.xlsx` through `rust_xlsxwriter`.

use std::collections::BTreeMap;
use std::path::Path;

use rust_xlsxwriter::{Workbook, Worksheet};
use scansheet_core::GridExtent;
use tracing::debug;

use crate::error::BackendError;
use crate::sink::{SheetId, WorkbookSink};

/// Rows in an xlsx worksheet.
pub const MAX_ROWS: u32 = 1_048_576;
/// Columns in an xlsx worksheet.
pub const MAX_COLUMNS: u32 = 16_384;

/// Excel's default column width, in characters.
const DEFAULT_COLUMN_WIDTH: f64 = 8.43;
/// Widest column Excel accepts, in characters.
const MAX_COLUMN_WIDTH: f64 = 255.0;

struct Sheet {
    worksheet: Worksheet,
    /// Longest text written per column, in characters.
    longest: BTreeMap<u16, usize>,
}

/// Collects sheets in memory and writes them as one `.xlsx` file on save.
///
/// Empty cells are not written, so they stay blank in the workbook.
pub struct XlsxSink {
    sheets: Vec<Sheet>,
}

impl XlsxSink {
    pub fn new() -> Self {
        Self { sheets: Vec::new() }
    }

    /// Number of sheets created so far.
    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    fn sheet_mut(&mut self, id: SheetId) -> Result<&mut Sheet, BackendError> {
        self.sheets
            .get_mut(id.0)
            .ok_or_else(|| BackendError::Sink(format!("unknown sheet id {}", id.0)))
    }
}

impl Default for XlsxSink {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkbookSink for XlsxSink {
    fn max_extent(&self) -> Option<GridExtent> {
        Some(GridExtent {
            max_row: MAX_ROWS - 1,
            max_column: MAX_COLUMNS - 1,
        })
    }

    fn create_sheet(&mut self, label: &str) -> Result<SheetId, BackendError> {
        let mut worksheet = Worksheet::new();
        worksheet
            .set_name(label)
            .map_err(|e| BackendError::Sink(format!("invalid sheet name '{label}': {e}")))?;
        self.sheets.push(Sheet {
            worksheet,
            longest: BTreeMap::new(),
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
        if row >= MAX_ROWS || column >= MAX_COLUMNS {
            return Err(BackendError::Sink(format!(
                "cell ({row}, {column}) is outside the worksheet limits \
                 ({MAX_ROWS} rows, {MAX_COLUMNS} columns)"
            )));
        }
        if text.is_empty() {
            return Ok(());
        }

        let column = column as u16;
        let sheet = self.sheet_mut(sheet)?;
        sheet
            .worksheet
            .write_string(row, column, text)
            .map_err(|e| BackendError::Sink(format!("write_string failed: {e}")))?;

        let chars = text.chars().count();
        let longest = sheet.longest.entry(column).or_insert(0);
        *longest = (*longest).max(chars);
        Ok(())
    }

    fn auto_size_column(&mut self, sheet: SheetId, column: u32) -> Result<(), BackendError> {
        if column >= MAX_COLUMNS {
            return Err(BackendError::Sink(format!(
                "column {column} is outside the worksheet limits ({MAX_COLUMNS} columns)"
            )));
        }
        let column = column as u16;
        let sheet = self.sheet_mut(sheet)?;
        let width = column_width(sheet.longest.get(&column).copied().unwrap_or(0));
        sheet
            .worksheet
            .set_column_width(column, width)
            .map_err(|e| BackendError::Sink(format!("set_column_width failed: {e}")))?;
        Ok(())
    }

    fn save(&mut self, path: &Path) -> Result<(), BackendError> {
        let mut workbook = Workbook::new();
        let count = self.sheets.len();
        for sheet in std::mem::take(&mut self.sheets) {
            workbook.push_worksheet(sheet.worksheet);
        }
        workbook
            .save(path)
            .map_err(|e| BackendError::Sink(format!("failed to save {}: {e}", path.display())))?;
        debug!(path = %path.display(), sheets = count, "saved workbook");
        Ok(())
    }
}

/// Column width in characters for text of `chars` characters.
fn column_width(chars: usize) -> f64 {
    (chars as f64 * 1.1 + 1.0).clamp(DEFAULT_COLUMN_WIDTH, MAX_COLUMN_WIDTH)
}
