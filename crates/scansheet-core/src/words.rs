use std::borrow::Borrow;

use crate::error::GridError;
use crate::geometry::BBox;

/// A word recognized on a rendered page image.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Word {
    /// The recognized text of this word.
    pub text: String,
    /// Pixel bounding box of the word (top-left origin).
    pub bbox: BBox,
}

impl Word {
    pub fn new(text: impl Into<String>, bbox: BBox) -> Self {
        Self {
            text: text.into(),
            bbox,
        }
    }

    /// Check the invariants a word source must uphold.
    ///
    /// `index` is the word's position in its page's word list and is carried
    /// into the error for diagnostics.
    pub fn validate(&self, index: usize) -> Result<(), GridError> {
        let reason = if self.text.is_empty() {
            Some("empty text".to_string())
        } else {
            self.bbox.defect()
        };

        match reason {
            Some(reason) => Err(GridError::InvalidWord {
                index,
                text: self.text.clone(),
                reason,
            }),
            None => Ok(()),
        }
    }
}

/// Sort words into reading order: top-to-bottom, then left-to-right.
///
/// Words are ordered by ascending `bbox.y`, ties broken by ascending `bbox.x`.
/// The sort is stable, so words with identical `(y, x)` keep their input order.
/// Works on owned words or on borrowed `&Word` slices.
pub fn sort_reading_order<W: Borrow<Word>>(words: &mut [W]) {
    words.sort_by(|a, b| {
        let (a, b) = (&a.borrow().bbox, &b.borrow().bbox);
        a.y.total_cmp(&b.y).then(a.x.total_cmp(&b.x))
    });
}
