//! Canvas-space geometry of every overlay primitive.
//!
//! Positions go through page projection then calibration. Symbol sizes
//! derive from `staff_px = staff_height * ratio_y * note_scale` and never
//! feed back into positions. Ledger lines are positions: they step by the
//! drawn staff's own line spacing.

use serde::Serialize;

use super::constants::*;
use super::surface::PathCommand;
use super::{classify, ConfidenceBucket};
use crate::calibration::{Calibration, PageProjection, Point};
use crate::layout::ScoreLayout;
use crate::pitch::{accidental_glyph, HeadShape, StemDirection};
use crate::records::NoteRecord;

/// Symbol dimensions in canvas pixels for one render pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SymbolMetrics {
    pub staff_px: f64,
    pub head_rx: f64,
    pub head_ry: f64,
    pub stem_length: f64,
}

impl SymbolMetrics {
    pub fn new(staff_height: f64, ratio_y: f64, note_scale: f64) -> Self {
        let staff_px = staff_height * ratio_y * note_scale;
        Self {
            staff_px,
            head_rx: (staff_px * HEAD_RX_RATIO).max(MIN_HEAD_RX),
            head_ry: (staff_px * HEAD_RY_RATIO).max(MIN_HEAD_RY),
            stem_length: (staff_px * STEM_LENGTH_RATIO).max(MIN_STEM_LENGTH),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HeadGeometry {
    pub center: Point,
    pub rx: f64,
    pub ry: f64,
    pub rotation_deg: f64,
    pub shape: HeadShape,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Segment {
    pub from: Point,
    pub to: Point,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccidentalGeometry {
    pub glyph: &'static str,
    pub center: Point,
    pub size: f64,
}

/// Everything drawn for one note.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteGeometry {
    pub id: String,
    pub bucket: ConfidenceBucket,
    pub head: HeadGeometry,
    pub stem: Option<Segment>,
    /// One closed outline per flag, nearest the stem tip first
    pub flags: Vec<Vec<PathCommand>>,
    pub ledger_lines: Vec<Segment>,
    pub accidental: Option<AccidentalGeometry>,
    /// Staff top and bottom line Y in canvas pixels
    pub staff_top: f64,
    pub staff_bottom: f64,
}

/// Shared per-pass state: page projection, calibration, symbol metrics.
#[derive(Debug, Clone, Copy)]
pub struct CanvasMapping {
    pub projection: PageProjection,
    pub calibration: Calibration,
    pub metrics: SymbolMetrics,
}

impl CanvasMapping {
    pub fn new(
        layout: &ScoreLayout,
        canvas_width: f64,
        canvas_height: f64,
        calibration: &Calibration,
    ) -> Self {
        let projection =
            PageProjection::new(canvas_width, canvas_height, layout.page_width, layout.page_height);
        Self {
            projection,
            calibration: *calibration,
            metrics: SymbolMetrics::new(layout.staff_height, projection.ratio_y, calibration.note_scale),
        }
    }

    /// Page tenths → final canvas pixels.
    pub fn to_canvas(&self, x_tenths: f64, y_tenths: f64) -> Point {
        self.calibration.forward(self.projection.project(x_tenths, y_tenths))
    }
}

/// Geometry of every non-rest note, in document order.
pub fn overlay_geometry(
    layout: &ScoreLayout,
    notes: &[NoteRecord],
    threshold: f64,
    canvas_width: f64,
    canvas_height: f64,
    calibration: &Calibration,
) -> Vec<NoteGeometry> {
    let mapping = CanvasMapping::new(layout, canvas_width, canvas_height, calibration);
    notes
        .iter()
        .filter(|n| !n.is_rest)
        .map(|n| note_geometry(layout, &mapping, n, threshold))
        .collect()
}

/// Geometry of a single note.
pub fn note_geometry(
    layout: &ScoreLayout,
    mapping: &CanvasMapping,
    note: &NoteRecord,
    threshold: f64,
) -> NoteGeometry {
    let m = &mapping.metrics;
    let center = mapping.to_canvas(note.absolute_x, note.absolute_y);

    let staff_top_tenths = layout.staff_top(note.system_index, note.part_index);
    let staff_top = mapping.to_canvas(note.absolute_x, staff_top_tenths).y;
    let staff_bottom = mapping
        .to_canvas(note.absolute_x, staff_top_tenths + layout.staff_height)
        .y;

    let head = HeadGeometry {
        center,
        rx: m.head_rx,
        ry: m.head_ry,
        rotation_deg: HEAD_TILT_DEG,
        shape: note.head_shape(),
    };

    let stem = stem_segment(center, note.stem, m);
    let anchor = stem.map_or(center, |s| s.to);
    let flags = (0..note.flag_count())
        .map(|i| flag_outline(anchor, i, note.stem, m))
        .collect();

    let extend = m.head_rx * (1.0 + LEDGER_EXTEND_RATIO);
    let line_spacing = ((staff_bottom - staff_top) / 4.0).max(MIN_LEDGER_SPACING);
    let ledger_lines = ledger_line_ys(center.y, staff_top, staff_bottom, line_spacing)
        .into_iter()
        .map(|y| Segment {
            from: Point::new(center.x - extend, y),
            to: Point::new(center.x + extend, y),
        })
        .collect();

    let accidental = accidental_glyph(note.alter).map(|glyph| AccidentalGeometry {
        glyph,
        center: Point::new(center.x - m.head_rx - ACCIDENTAL_OFFSET_RATIO * m.head_ry, center.y),
        size: m.head_ry * ACCIDENTAL_SIZE_RATIO,
    });

    NoteGeometry {
        id: note.id.clone(),
        bucket: classify(note.review_status, note.confidence, threshold),
        head,
        stem,
        flags,
        ledger_lines,
        accidental,
        staff_top,
        staff_bottom,
    }
}

fn stem_segment(center: Point, stem: StemDirection, m: &SymbolMetrics) -> Option<Segment> {
    let attach = m.head_rx * STEM_ATTACH_RATIO;
    match stem {
        StemDirection::Up => Some(Segment {
            from: Point::new(center.x + attach, center.y),
            to: Point::new(center.x + attach, center.y - m.stem_length),
        }),
        StemDirection::Down => Some(Segment {
            from: Point::new(center.x - attach, center.y),
            to: Point::new(center.x - attach, center.y + m.stem_length),
        }),
        StemDirection::None => None,
    }
}

/// Closed outline of flag `index`, stacked along the stem away from the head.
///
/// Flags on an up-stem (or on a stemless note) hang downward to the right;
/// flags on a down-stem rise to the right.
fn flag_outline(anchor: Point, index: usize, stem: StemDirection, m: &SymbolMetrics) -> Vec<PathCommand> {
    // Vertical sense of the flag body: +1 hangs down, -1 rises.
    let v = match stem {
        StemDirection::Down => -1.0,
        StemDirection::Up | StemDirection::None => 1.0,
    };
    let spacing = m.staff_px * FLAG_SPACING_RATIO;
    let length = m.staff_px * FLAG_LENGTH_RATIO;
    let width = m.head_rx * FLAG_WIDTH_RATIO;
    let thickness = (m.staff_px * FLAG_THICKNESS_RATIO).max(1.0);

    let x = anchor.x;
    let y = anchor.y - v * spacing * index as f64;
    let p = |dx: f64, dy: f64| Point::new(x + dx, y + v * dy);

    vec![
        PathCommand::MoveTo(p(0.0, 0.0)),
        PathCommand::CubicTo(p(width * 0.15, length * 0.30), p(width * 1.10, length * 0.45), p(width, length)),
        PathCommand::LineTo(p(width * 0.85, length)),
        PathCommand::CubicTo(
            p(width * 0.90, length * 0.60),
            p(width * 0.10, length * 0.40 + thickness),
            p(0.0, thickness),
        ),
        PathCommand::Close,
    ]
}

/// Y positions of the ledger lines for a head at `note_y`.
///
/// Lines lie outside the staff only, one `spacing` apart, starting one
/// spacing beyond the nearer staff boundary and continuing while within
/// half a spacing of the head center (boundary inclusive).
pub fn ledger_line_ys(note_y: f64, staff_top: f64, staff_bottom: f64, spacing: f64) -> Vec<f64> {
    const EPS: f64 = 1e-6;
    let reach = spacing / 2.0 + EPS;
    let mut ys = Vec::new();

    if note_y < staff_top {
        let mut y = staff_top - spacing;
        while y >= note_y - reach {
            ys.push(y);
            y -= spacing;
        }
    } else if note_y > staff_bottom {
        let mut y = staff_bottom + spacing;
        while y <= note_y + reach {
            ys.push(y);
            y += spacing;
        }
    }

    ys
}
