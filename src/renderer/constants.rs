//! Shared constants for the overlay renderer.
//!
//! Symbol sizes are proportions of `staff_px`, the rendered height of a
//! five-line staff (4 staff spaces), with pixel floors so symbols stay
//! visible when zoomed far out.

// ── Note heads ──────────────────────────────────────────────────────
pub(super) const HEAD_RX_RATIO: f64 = 0.165;
pub(super) const HEAD_RY_RATIO: f64 = 0.125;
pub(super) const MIN_HEAD_RX: f64 = 3.5;
pub(super) const MIN_HEAD_RY: f64 = 2.5;
/// Calligraphic pen tilt of every head ellipse, in degrees
pub(super) const HEAD_TILT_DEG: f64 = -20.0;
pub(super) const OPEN_HEAD_STROKE: f64 = 1.4;

// ── Stems & flags ───────────────────────────────────────────────────
pub(super) const STEM_LENGTH_RATIO: f64 = 0.875;
pub(super) const MIN_STEM_LENGTH: f64 = 12.0;
/// Stem x offset from the head center, as a fraction of rx
pub(super) const STEM_ATTACH_RATIO: f64 = 0.92;
pub(super) const STEM_WIDTH: f64 = 1.2;
pub(super) const FLAG_SPACING_RATIO: f64 = 0.19;
pub(super) const FLAG_LENGTH_RATIO: f64 = 0.55;
pub(super) const FLAG_WIDTH_RATIO: f64 = 1.5;
pub(super) const FLAG_THICKNESS_RATIO: f64 = 0.11;

// ── Ledger lines ────────────────────────────────────────────────────
/// Floor on the drawn staff-line spacing ledger lines step by
pub(super) const MIN_LEDGER_SPACING: f64 = 2.0;
/// How far a ledger line reaches past the head, as a fraction of rx
pub(super) const LEDGER_EXTEND_RATIO: f64 = 0.5;
pub(super) const LEDGER_LINE_WIDTH: f64 = 1.0;

// ── Accidentals ─────────────────────────────────────────────────────
/// Gap between the head's left edge and the glyph center, in units of ry
pub(super) const ACCIDENTAL_OFFSET_RATIO: f64 = 1.8;
pub(super) const ACCIDENTAL_SIZE_RATIO: f64 = 3.2;

// ── Colors ──────────────────────────────────────────────────────────
pub(super) const VERIFIED_COLOR: &str = "#2e7d32";
pub(super) const ABOVE_COLOR: &str = "#1565c0";
pub(super) const BELOW_COLOR: &str = "#c62828";
