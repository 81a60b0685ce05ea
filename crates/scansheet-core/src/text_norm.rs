//! Unicode normalization for OCR output.
//!
//! OCR engines occasionally emit compatibility forms (ligatures such as
//! U+FB01, full-width digits) for text that reads the same as its plain
//! form. [`TextNorm`] selects the normalization applied to each word before
//! it is placed in a cell.

use unicode_normalization::UnicodeNormalization;

/// Unicode normalization form to apply to word text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TextNorm {
    /// No normalization (default).
    #[default]
    None,
    /// Canonical Decomposition, followed by Canonical Composition (NFC).
    Nfc,
    /// Compatibility Decomposition, followed by Canonical Composition (NFKC).
    Nfkc,
}

impl TextNorm {
    /// Apply this normalization form to the given string.
    ///
    /// Returns the input unchanged if normalization is `None`.
    pub fn normalize(&self, text: &str) -> String {
        match self {
            TextNorm::None => text.to_string(),
            TextNorm::Nfc => text.nfc().collect(),
            TextNorm::Nfkc => text.nfkc().collect(),
        }
    }
}
