//! Overlay renderer — draws recognized notes over the scanned page.
//!
//! [`overlay_geometry`] computes every primitive in canvas pixels;
//! [`render`] clears a [`Surface`] and paints that geometry. Both are pure
//! in their inputs, so redrawing with unchanged inputs repaints the same
//! pixels.

mod constants;
mod geometry;
mod surface;

use serde::{Deserialize, Serialize};

use crate::calibration::Calibration;
use crate::layout::ScoreLayout;
use crate::pitch::HeadShape;
use crate::records::{NoteRecord, ReviewStatus};
use constants::*;

pub use geometry::{
    ledger_line_ys, note_geometry, overlay_geometry, AccidentalGeometry, CanvasMapping,
    HeadGeometry, NoteGeometry, Segment, SymbolMetrics,
};
pub use surface::{Paint, PathCommand, Surface, SvgSurface};

/// Color class of a note, decided by review state and confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceBucket {
    /// Reviewed by the user (verified or corrected)
    Verified,
    /// Unreviewed, confidence at or above the threshold
    Above,
    /// Unreviewed, confidence below the threshold
    Below,
}

impl ConfidenceBucket {
    pub fn color(self) -> &'static str {
        match self {
            ConfidenceBucket::Verified => VERIFIED_COLOR,
            ConfidenceBucket::Above => ABOVE_COLOR,
            ConfidenceBucket::Below => BELOW_COLOR,
        }
    }
}

/// Three-way color decision. Review state wins over confidence.
pub fn classify(status: ReviewStatus, confidence: f64, threshold: f64) -> ConfidenceBucket {
    match status {
        ReviewStatus::Verified | ReviewStatus::Corrected => ConfidenceBucket::Verified,
        ReviewStatus::Unreviewed if confidence >= threshold => ConfidenceBucket::Above,
        ReviewStatus::Unreviewed => ConfidenceBucket::Below,
    }
}

/// Clear `surface` and draw the full overlay.
pub fn render<S: Surface + ?Sized>(
    surface: &mut S,
    layout: &ScoreLayout,
    notes: &[NoteRecord],
    threshold: f64,
    canvas_width: f64,
    canvas_height: f64,
    calibration: &Calibration,
) {
    surface.clear(canvas_width, canvas_height);
    let geometry = overlay_geometry(layout, notes, threshold, canvas_width, canvas_height, calibration);
    for g in &geometry {
        paint_note(surface, g);
    }
}

/// Render the overlay to a standalone SVG string.
pub fn render_to_svg(
    layout: &ScoreLayout,
    notes: &[NoteRecord],
    threshold: f64,
    canvas_width: f64,
    canvas_height: f64,
    calibration: &Calibration,
) -> String {
    let mut svg = SvgSurface::new(canvas_width, canvas_height);
    render(&mut svg, layout, notes, threshold, canvas_width, canvas_height, calibration);
    svg.build()
}

fn paint_note<S: Surface + ?Sized>(surface: &mut S, g: &NoteGeometry) {
    let color = g.bucket.color();

    for ledger in &g.ledger_lines {
        surface.line(ledger.from, ledger.to, color, LEDGER_LINE_WIDTH);
    }

    let paint = match g.head.shape {
        HeadShape::Filled => Paint::Fill(color),
        HeadShape::Open => Paint::Stroke(color, OPEN_HEAD_STROKE),
    };
    surface.ellipse(g.head.center, g.head.rx, g.head.ry, g.head.rotation_deg, paint);

    if let Some(stem) = g.stem {
        surface.line(stem.from, stem.to, color, STEM_WIDTH);
    }
    for flag in &g.flags {
        surface.fill_path(flag, color);
    }
    if let Some(ref acc) = g.accidental {
        surface.text(acc.center, acc.glyph, acc.size, color);
    }
}
