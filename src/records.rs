//! Flat, positioned note records: the overlay view of a score.

use serde::{Deserialize, Serialize};

use crate::layout::ScoreLayout;
use crate::pitch::{ClefInfo, DurationClass, HeadShape, StemDirection, Step};

/// Review state of a recognized note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    #[default]
    Unreviewed,
    Verified,
    Corrected,
}

/// One positioned note. Produced once per document load and never mutated;
/// corrections are merged over it at read time (see `review`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteRecord {
    /// Stable identity, see [`note_id`]
    pub id: String,
    pub step: Step,
    pub octave: i32,
    /// -2 (double flat) … 2 (double sharp)
    pub alter: i8,
    pub duration: DurationClass,
    pub stem: StemDirection,
    /// Head center X, tenths from the page's left edge
    pub absolute_x: f64,
    /// Head center Y, tenths from the page top
    pub absolute_y: f64,
    pub part_index: usize,
    /// Global measure index (not reset per system)
    pub measure_index: usize,
    pub system_index: usize,
    /// Position of the note within its measure, rests included
    pub note_index: usize,
    pub is_rest: bool,
    /// Placeholder recognition confidence in [0.52, 1.0]
    pub confidence: f64,
    pub review_status: ReviewStatus,
}

impl NoteRecord {
    pub fn flag_count(&self) -> usize {
        self.duration.flag_count()
    }

    pub fn head_shape(&self) -> HeadShape {
        self.duration.head_shape()
    }
}

/// Identity of a note from its (part, measure, note-in-measure) indices.
pub fn note_id(part_index: usize, measure_index: usize, note_index: usize) -> String {
    format!("p{part_index}-m{measure_index}-n{note_index}")
}

/// Key signature of a part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyInfo {
    /// Sharps (positive) or flats (negative), -7 … 7
    pub fifths: i32,
    pub mode: String,
}

impl Default for KeyInfo {
    fn default() -> Self {
        Self { fifths: 0, mode: "major".to_string() }
    }
}

/// Time signature of a part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeInfo {
    Metered { beats: i32, beat_type: i32 },
    FreeTime,
}

impl Default for TimeInfo {
    fn default() -> Self {
        TimeInfo::Metered { beats: 4, beat_type: 4 }
    }
}

/// Static per-part metadata, read from the part's first measure.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PartInfo {
    pub name: String,
    pub clef: ClefInfo,
    pub key: KeyInfo,
    pub time: TimeInfo,
}

/// Result of loading a document for overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayScore {
    /// Non-rest notes in document order
    pub notes: Vec<NoteRecord>,
    pub layout: ScoreLayout,
    pub parts: Vec<PartInfo>,
}

impl OverlayScore {
    /// Page size in tenths as `(width, height)`.
    pub fn page_size(&self) -> (f64, f64) {
        (self.layout.page_width, self.layout.page_height)
    }

    pub fn note(&self, id: &str) -> Option<&NoteRecord> {
        self.notes.iter().find(|n| n.id == id)
    }
}
