/// Axis-aligned pixel rectangle locating a recognized word on a page image.
///
/// Coordinates follow image convention:
/// - `x`: left edge, in pixels from the left of the image
/// - `y`: top edge, in pixels from the top of the image
/// - `width`, `height`: extent of the box in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Describe why this box cannot come from a correct word source, if it can't.
    ///
    /// Origins must be finite and non-negative, extents finite and strictly
    /// positive.
    pub(crate) fn defect(&self) -> Option<String> {
        if !self.x.is_finite() || !self.y.is_finite() {
            return Some(format!("non-finite origin ({}, {})", self.x, self.y));
        }
        if self.x < 0.0 || self.y < 0.0 {
            return Some(format!("negative origin ({}, {})", self.x, self.y));
        }
        if !self.width.is_finite() || !self.height.is_finite() {
            return Some(format!("non-finite size {}x{}", self.width, self.height));
        }
        if self.width <= 0.0 || self.height <= 0.0 {
            return Some(format!("non-positive size {}x{}", self.width, self.height));
        }
        None
    }
}
