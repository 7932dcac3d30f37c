//! scoreoverlay — score-coordinate geometry for reviewing OMR results.
//!
//! Loads a MusicXML document, places every recognized note on the page in
//! tenths, maps those positions onto a calibrated canvas for drawing, and
//! maps canvas clicks back to notes.
//!
//! Supports both uncompressed MusicXML (.musicxml) and compressed MXL (.mxl) files.
//!
//! # Example
//! ```no_run
//! use scoreoverlay::{find_nearest, load_overlay_file, render_to_svg, Calibration};
//!
//! let overlay = load_overlay_file("path/to/score.musicxml").unwrap();
//! let cal = Calibration { offset_x: 4.0, scale_y: 1.02, ..Calibration::IDENTITY };
//! let svg = render_to_svg(&overlay.layout, &overlay.notes, 0.75, 1305.0, 1690.0, &cal);
//! let hit = find_nearest(&overlay.layout, &overlay.notes, 210.0, 240.0, 1305.0, 1690.0, &cal, 18.0);
//! println!("{} bytes of SVG, hit: {:?}", svg.len(), hit.map(|n| &n.id));
//! ```

pub mod calibration;
pub mod error;
pub mod extract;
pub mod layout;
pub mod model;
pub mod mxl;
pub mod parser;
pub mod pitch;
pub mod records;
pub mod renderer;
pub mod review;

use std::path::Path;

pub use calibration::{Calibration, PageProjection, Point};
pub use error::ParseError;
pub use extract::{build_overlay, mock_confidence};
pub use hit_test::{find_nearest, DEFAULT_HIT_RADIUS};
pub use layout::ScoreLayout;
pub use model::Score;
pub use mxl::parse_mxl;
pub use parser::parse_musicxml;
pub use pitch::{ClefInfo, DurationClass, HeadShape, StemDirection, Step};
pub use records::{NoteRecord, OverlayScore, PartInfo, ReviewStatus};
pub use renderer::{classify, overlay_geometry, render, render_to_svg, ConfidenceBucket, Surface, SvgSurface};
pub use review::{Correction, ReviewError, ReviewSession};

/// Parse a MusicXML file from a file path.
/// Automatically detects format based on file extension:
/// - `.musicxml` or `.xml` → uncompressed MusicXML
/// - `.mxl` → compressed MXL (ZIP archive)
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Score, ParseError> {
    let path = path.as_ref();
    let data = std::fs::read(path).map_err(|source| ParseError::Io {
        path: path.display().to_string(),
        source,
    })?;

    parse_bytes(&data, path.extension().and_then(|e| e.to_str()))
}

/// Parse MusicXML from raw bytes with an optional format hint.
/// If `extension` is None, tries to auto-detect the format.
pub fn parse_bytes(data: &[u8], extension: Option<&str>) -> Result<Score, ParseError> {
    match extension {
        Some("mxl") => parse_mxl(data),
        Some("musicxml") | Some("xml") => parse_musicxml(std::str::from_utf8(data)?),
        _ => {
            // Auto-detect: try as XML first, then as MXL
            if let Ok(xml) = std::str::from_utf8(data) {
                if xml.trim_start().starts_with('<') {
                    return parse_musicxml(xml);
                }
            }
            parse_mxl(data)
        }
    }
}

/// Parse MusicXML text and position its notes using the layout the
/// document itself describes.
pub fn load_overlay(xml: &str) -> Result<OverlayScore, ParseError> {
    let score = parse_musicxml(xml)?;
    Ok(build_overlay(&score, &ScoreLayout::from_score(&score)))
}

/// Parse MusicXML text and position its notes with an explicit layout.
pub fn load_overlay_with_layout(xml: &str, layout: &ScoreLayout) -> Result<OverlayScore, ParseError> {
    let score = parse_musicxml(xml)?;
    Ok(build_overlay(&score, layout))
}

/// Load a .musicxml/.xml/.mxl file for overlay, with its own layout.
pub fn load_overlay_file<P: AsRef<Path>>(path: P) -> Result<OverlayScore, ParseError> {
    let score = parse_file(path)?;
    Ok(build_overlay(&score, &ScoreLayout::from_score(&score)))
}

/// Serialize a loaded overlay for the UI layer.
pub fn overlay_to_json(overlay: &OverlayScore) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(overlay)
}
