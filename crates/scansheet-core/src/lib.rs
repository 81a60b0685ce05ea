//! scansheet-core: Backend-independent data types and grid reconstruction.
//!
//! This crate provides the foundational types ([`BBox`], [`Word`],
//! [`GridCoordinate`], [`PageGrid`]) and the [`GridMapper`] that turns an
//! unordered set of OCR words into a sparse row/column grid. It performs no
//! I/O: rasterization, OCR and spreadsheet output live in the `scansheet`
//! facade crate.

pub mod error;
pub mod geometry;
pub mod grid;
pub mod text_norm;
pub mod words;

pub use error::GridError;
pub use geometry::BBox;
pub use grid::{GridCoordinate, GridExtent, GridMapper, GridOptions, PageGrid};
pub use text_norm::TextNorm;
pub use words::{Word, sort_reading_order};
