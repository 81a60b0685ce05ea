//! Spatial layout reconstruction: words to a sparse row/column grid.
//!
//! [`GridMapper`] quantizes each word's top-left corner into a
//! [`GridCoordinate`] using fixed pixel-per-unit ratios, visits words in
//! reading order, and space-joins words that land in the same cell. The
//! result is a [`PageGrid`]: a sparse map from coordinates to cell text plus
//! the largest row and column reached.
//!
//! This is a heuristic. It ignores font metrics and ruling lines, so column
//! alignment across rows with different content widths is not guaranteed.

use std::borrow::Borrow;
use std::collections::BTreeMap;

use crate::error::GridError;
use crate::geometry::BBox;
use crate::text_norm::TextNorm;
use crate::words::{Word, sort_reading_order};

/// Options for grid reconstruction.
///
/// Defaults assume a page rendered at 300 DPI, where one spreadsheet row is
/// roughly 20 pixels tall and one column roughly 50 pixels wide.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridOptions {
    /// Pixels per grid row (vertical quantization step).
    pub pixels_per_row_unit: f64,
    /// Pixels per grid column (horizontal quantization step).
    pub pixels_per_column_unit: f64,
    /// Unicode normalization applied to each word before placement.
    pub text_norm: TextNorm,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            pixels_per_row_unit: 20.0,
            pixels_per_column_unit: 50.0,
            text_norm: TextNorm::None,
        }
    }
}

impl GridOptions {
    /// Check that both ratios are finite and strictly positive.
    pub fn validate(&self) -> Result<(), GridError> {
        for (name, value) in [
            ("pixels_per_row_unit", self.pixels_per_row_unit),
            ("pixels_per_column_unit", self.pixels_per_column_unit),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(GridError::InvalidOptions(format!(
                    "{name} must be a positive number (got {value})"
                )));
            }
        }
        Ok(())
    }

    /// Grid coordinate of a bounding box's top-left corner.
    ///
    /// `row = floor(y / pixels_per_row_unit)`,
    /// `column = floor(x / pixels_per_column_unit)`. Returns `None` when
    /// either index does not fit in a `u32`, or the box origin is negative
    /// or not finite.
    pub fn coordinate(&self, bbox: &BBox) -> Option<GridCoordinate> {
        Some(GridCoordinate {
            row: quantize(bbox.y, self.pixels_per_row_unit)?,
            column: quantize(bbox.x, self.pixels_per_column_unit)?,
        })
    }
}

/// `floor(value / ratio)` as a grid index, if it is one.
fn quantize(value: f64, ratio: f64) -> Option<u32> {
    let index = (value / ratio).floor();
    if index >= 0.0 && index <= f64::from(u32::MAX) {
        Some(index as u32)
    } else {
        None
    }
}

/// Discrete (row, column) position of a cell. Orders row-major.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridCoordinate {
    pub row: u32,
    pub column: u32,
}

impl GridCoordinate {
    pub fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }
}

/// Largest row and column index reached on a non-empty page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridExtent {
    pub max_row: u32,
    pub max_column: u32,
}

impl GridExtent {
    /// Number of rows a dense sheet needs (`max_row + 1`).
    pub fn row_count(&self) -> usize {
        self.max_row as usize + 1
    }

    /// Number of columns a dense sheet needs (`max_column + 1`).
    pub fn column_count(&self) -> usize {
        self.max_column as usize + 1
    }

    fn include(&mut self, coord: GridCoordinate) {
        self.max_row = self.max_row.max(coord.row);
        self.max_column = self.max_column.max(coord.column);
    }
}

/// Sparse grid for one page: cell text keyed by coordinate.
///
/// An empty page has no cells and no extent (`extent() == None`). Cells are
/// only ever appended to, never replaced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageGrid {
    cells: BTreeMap<GridCoordinate, String>,
    extent: Option<GridExtent>,
}

impl PageGrid {
    /// Create an empty grid.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if no word was placed.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Number of occupied cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Largest row/column reached, or `None` for an empty page.
    pub fn extent(&self) -> Option<GridExtent> {
        self.extent
    }

    /// Largest row index reached, or `None` for an empty page.
    pub fn max_row(&self) -> Option<u32> {
        self.extent.map(|e| e.max_row)
    }

    /// Largest column index reached, or `None` for an empty page.
    pub fn max_column(&self) -> Option<u32> {
        self.extent.map(|e| e.max_column)
    }

    /// Text of the cell at `(row, column)`, if occupied.
    pub fn get(&self, row: u32, column: u32) -> Option<&str> {
        self.cells
            .get(&GridCoordinate::new(row, column))
            .map(String::as_str)
    }

    /// Occupied cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (GridCoordinate, &str)> {
        self.cells.iter().map(|(c, t)| (*c, t.as_str()))
    }

    /// Expand into a dense `rows x columns` table, `""` where no cell exists.
    ///
    /// Returns an empty vector for an empty page.
    pub fn to_rows(&self) -> Vec<Vec<&str>> {
        let Some(extent) = self.extent else {
            return Vec::new();
        };

        let mut rows = vec![vec![""; extent.column_count()]; extent.row_count()];
        for (coord, text) in &self.cells {
            rows[coord.row as usize][coord.column as usize] = text.as_str();
        }
        rows
    }

    /// Append `text` to the cell at `coord`, creating it if needed.
    fn append(&mut self, coord: GridCoordinate, text: &str) {
        self.cells
            .entry(coord)
            .and_modify(|cell| {
                cell.push(' ');
                cell.push_str(text);
            })
            .or_insert_with(|| text.to_string());

        match self.extent.as_mut() {
            Some(extent) => extent.include(coord),
            None => {
                self.extent = Some(GridExtent {
                    max_row: coord.row,
                    max_column: coord.column,
                })
            }
        }
    }
}

/// Maps a page's words into a [`PageGrid`].
///
/// Stateless: each call builds a fresh grid.
pub struct GridMapper;

impl GridMapper {
    /// Place the given words into a grid using the specified options.
    ///
    /// - Every word is validated first; one malformed word fails the page.
    ///   A word whose cell index would not fit in a `u32` counts as malformed.
    /// - Words are visited in reading order (ascending `y`, then `x`, stable).
    /// - Each word's text (after [`TextNorm`]) becomes the cell value, or is
    ///   appended after a single space if the cell already has text.
    ///
    /// Empty input yields an empty grid.
    pub fn map(words: &[Word], options: &GridOptions) -> Result<PageGrid, GridError> {
        options.validate()?;
        let mut placed = Vec::with_capacity(words.len());
        for (index, word) in words.iter().enumerate() {
            word.validate(index)?;
            let coord = options
                .coordinate(&word.bbox)
                .ok_or_else(|| GridError::InvalidWord {
                    index,
                    text: word.text.clone(),
                    reason: format!(
                        "origin ({}, {}) is past the last addressable cell",
                        word.bbox.x, word.bbox.y
                    ),
                })?;
            placed.push(Placed { word, coord });
        }

        sort_reading_order(&mut placed);

        let mut grid = PageGrid::new();
        for Placed { word, coord } in placed {
            match options.text_norm {
                TextNorm::None => grid.append(coord, &word.text),
                norm => grid.append(coord, &norm.normalize(&word.text)),
            }
        }

        Ok(grid)
    }
}

/// A validated word paired with its cell.
struct Placed<'a> {
    word: &'a Word,
    coord: GridCoordinate,
}

impl Borrow<Word> for Placed<'_> {
    fn borrow(&self) -> &Word {
        self.word
    }
}
