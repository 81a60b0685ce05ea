//! Collaborator interface on the output side: the workbook.

use std::path::Path;

use scansheet_core::GridExtent;

use crate::error::BackendError;

/// Handle to a sheet created by a [`WorkbookSink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SheetId(pub usize);

/// Receives one dense grid per page and persists them as a workbook.
///
/// The assembler never reads back from a sink. Sheets must be kept in
/// creation order.
pub trait WorkbookSink {
    /// Largest row and column index a sheet can hold, or `None` if unbounded.
    ///
    /// A page whose grid exceeds this is skipped before its sheet is created.
    fn max_extent(&self) -> Option<GridExtent> {
        None
    }

    /// Create a new, empty sheet named `label`.
    fn create_sheet(&mut self, label: &str) -> Result<SheetId, BackendError>;

    /// Write `text` into a cell. An empty `text` marks an empty cell.
    fn set_cell(
        &mut self,
        sheet: SheetId,
        row: u32,
        column: u32,
        text: &str,
    ) -> Result<(), BackendError>;

    /// Size `column` of `sheet` to fit its final content.
    fn auto_size_column(&mut self, sheet: SheetId, column: u32) -> Result<(), BackendError>;

    /// Persist all sheets to `path`.
    fn save(&mut self, path: &Path) -> Result<(), BackendError>;
}
