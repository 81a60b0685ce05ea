//! Error type for grid reconstruction.
//!
//! [`GridError`] covers the two ways the Grid Mapper can refuse its input:
//! a malformed word from the word source, or pixel ratios that cannot
//! produce a grid.

use std::fmt;

/// Fatal error for mapping one page's words into a grid.
#[derive(Debug, Clone, PartialEq)]
pub enum GridError {
    /// A word violates the non-negative origin / positive size invariant.
    InvalidWord {
        /// Position of the offending word in the input slice.
        index: usize,
        /// Text of the offending word.
        text: String,
        /// Human-readable description of the violation.
        reason: String,
    },
    /// The grid options cannot be used (non-positive or non-finite ratio).
    InvalidOptions(String),
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridError::InvalidWord {
                index,
                text,
                reason,
            } => write!(f, "invalid word #{index} {text:?}: {reason}"),
            GridError::InvalidOptions(msg) => write!(f, "invalid grid options: {msg}"),
        }
    }
}

impl std::error::Error for GridError {}
