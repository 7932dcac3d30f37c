//! Calibration transform between page-projected and canvas coordinates.
//!
//! Two stages map a note from page tenths to the canvas:
//!
//! 1. [`PageProjection`] scales tenths by the canvas/page size ratio
//!    ("raw" canvas coordinates);
//! 2. [`Calibration`] applies a per-axis `raw * scale + offset` so the
//!    overlay lines up with the scanned image.
//!
//! `note_scale` is carried alongside but never touches positions; it only
//! sizes the drawn symbols.

use serde::{Deserialize, Serialize};

/// Scale range a UI should keep calibration within.
pub const MIN_SCALE: f64 = 0.5;
pub const MAX_SCALE: f64 = 2.0;

/// A point in some 2D coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Page tenths → raw canvas pixels, by the canvas/page size ratio per axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageProjection {
    pub ratio_x: f64,
    pub ratio_y: f64,
}

impl PageProjection {
    pub fn new(canvas_width: f64, canvas_height: f64, page_width: f64, page_height: f64) -> Self {
        Self {
            ratio_x: canvas_width / page_width,
            ratio_y: canvas_height / page_height,
        }
    }

    pub fn project(&self, x_tenths: f64, y_tenths: f64) -> Point {
        Point::new(x_tenths * self.ratio_x, y_tenths * self.ratio_y)
    }
}

/// User calibration of the overlay against the scanned image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Calibration {
    pub offset_x: f64,
    pub offset_y: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    /// Symbol size multiplier; positions are unaffected
    pub note_scale: f64,
}

impl Default for Calibration {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Calibration {
    pub const IDENTITY: Calibration = Calibration {
        offset_x: 0.0,
        offset_y: 0.0,
        scale_x: 1.0,
        scale_y: 1.0,
        note_scale: 1.0,
    };

    /// Raw (page-projected) coordinates → canvas pixels.
    pub fn forward(&self, raw: Point) -> Point {
        Point::new(
            raw.x * self.scale_x + self.offset_x,
            raw.y * self.scale_y + self.offset_y,
        )
    }

    /// Canvas pixels → raw coordinates.
    ///
    /// Scales must be nonzero; this divides without checking and yields
    /// non-finite coordinates otherwise. Use [`Calibration::clamped`] at the
    /// UI boundary.
    pub fn inverse(&self, canvas: Point) -> Point {
        Point::new(
            (canvas.x - self.offset_x) / self.scale_x,
            (canvas.y - self.offset_y) / self.scale_y,
        )
    }

    /// Copy with all scales clamped to `[MIN_SCALE, MAX_SCALE]`.
    /// Non-finite scales reset to 1.
    pub fn clamped(&self) -> Calibration {
        let clamp = |s: f64| if s.is_finite() { s.clamp(MIN_SCALE, MAX_SCALE) } else { 1.0 };
        Calibration {
            scale_x: clamp(self.scale_x),
            scale_y: clamp(self.scale_y),
            note_scale: clamp(self.note_scale),
            ..*self
        }
    }
}
