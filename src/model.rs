//! Document model for a parsed MusicXML score.
//!
//! This is the hierarchical form of the input (parts → measures → notes),
//! kept close to the MusicXML structure. Fields are optional wherever the
//! format allows omission; `extract` resolves the defaults.

use serde::{Deserialize, Serialize};

/// A complete musical score parsed from MusicXML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Score {
    /// Title of the piece
    pub title: Option<String>,
    /// MusicXML version (e.g., "3.1", "4.0")
    pub version: Option<String>,
    /// Page layout defaults
    pub defaults: Option<Defaults>,
    /// Musical parts, in the order of the `<part>` elements
    pub parts: Vec<Part>,
}

/// Page layout defaults from `<defaults>`. All lengths are in tenths.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Defaults {
    pub page_height: Option<f64>,
    pub page_width: Option<f64>,
    pub left_margin: Option<f64>,
    pub top_margin: Option<f64>,
    /// Default system layout (system margins and distances)
    pub system_layout: Option<SystemLayout>,
    /// Default distance between staves of consecutive parts
    pub staff_distance: Option<f64>,
}

/// `<system-layout>` values, either from `<defaults>` or a `<print>`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemLayout {
    pub left_margin: Option<f64>,
    /// Distance from the bottom of one system to the top of the next
    pub system_distance: Option<f64>,
    /// Distance from the top page margin to the first system on a page
    pub top_system_distance: Option<f64>,
}

/// A musical part (one instrument or voice).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    /// Part identifier (e.g., "P1")
    pub id: String,
    /// Part name (e.g., "Classical Guitar")
    pub name: String,
    /// Abbreviated name (e.g., "Guit.")
    pub abbreviation: Option<String>,
    /// Ordered list of measures
    pub measures: Vec<Measure>,
}

/// A single measure (bar) of music.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Measure {
    /// Width in tenths (for layout)
    pub width: Option<f64>,
    /// Attributes (key, time, clef), present only when they change
    pub attributes: Option<Attributes>,
    /// Notes and rests in this measure
    pub notes: Vec<Note>,
    /// Whether this measure starts a new system (line or page break)
    pub new_system: bool,
    /// System layout override carried by this measure's `<print>`
    pub system_layout: Option<SystemLayout>,
    /// Staff distance override carried by this measure's `<print>`
    pub staff_distance: Option<f64>,
}

/// Musical attributes that may change at the start of a measure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Attributes {
    pub key: Option<Key>,
    pub time: Option<TimeSignature>,
    /// Clef(s), one per staff, each tagged with a staff `number`.
    pub clefs: Vec<Clef>,
}

/// Key signature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Key {
    /// Number of sharps (positive) or flats (negative)
    pub fifths: i32,
    /// Mode (e.g., "major", "minor")
    pub mode: Option<String>,
}

/// Time signature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSignature {
    /// Numerator (e.g., 3 in 3/4)
    pub beats: i32,
    /// Denominator (e.g., 4 in 3/4)
    pub beat_type: i32,
    /// `<senza-misura>` present: no metric time signature
    pub senza_misura: bool,
}

/// Clef definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clef {
    /// Staff number this clef belongs to (1-based; defaults to 1)
    pub number: i32,
    /// Clef sign: "G" (treble), "F" (bass), "C" (alto/tenor)
    pub sign: String,
    /// Staff line the clef sits on
    pub line: i32,
    /// Octave transposition (e.g., -1 for guitar's octave-lower treble clef)
    pub octave_change: Option<i32>,
}

/// A single note or rest.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Note {
    /// Pitch (None for rests, or when the source omitted it)
    pub pitch: Option<Pitch>,
    /// Note type: "whole", "half", "quarter", "eighth", "16th", ...
    pub note_type: Option<String>,
    /// Stem direction hint: "up", "down", "none", ...
    pub stem: Option<String>,
    pub rest: bool,
    /// Staff number within a multi-staff part (1-based)
    pub staff: Option<i32>,
    /// Default X position in tenths, relative to the measure start
    pub default_x: Option<f64>,
}

/// Pitch of a note, as written in the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pitch {
    /// Note name: A, B, C, D, E, F, G
    pub step: String,
    /// Octave number (middle C = C4)
    pub octave: i32,
    /// Chromatic alteration: -1.0 = flat, 1.0 = sharp
    pub alter: Option<f64>,
}

impl Score {
    /// Create a new empty score.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of measures, taken from the first part.
    pub fn measure_count(&self) -> usize {
        self.parts.first().map_or(0, |p| p.measures.len())
    }
}
