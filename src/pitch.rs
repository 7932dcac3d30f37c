//! Pitch and duration mapping — the semantic quantities layout needs.
//!
//! Vertical placement is linear in the diatonic pitch number
//! `p = octave * 7 + step_index`: every diatonic step moves the head half a
//! staff space (5 tenths). The clef only fixes the intercept, by pinning a
//! reference pitch to one staff line.

use serde::{Deserialize, Serialize};

/// Distance between two adjacent staff lines, in tenths.
pub const STAFF_SPACE: f64 = 10.0;

/// Vertical distance of one diatonic step, in tenths.
pub const DIATONIC_STEP: f64 = STAFF_SPACE / 2.0;

/// Diatonic step name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Step {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

impl Step {
    /// Position within the octave, C = 0 … B = 6.
    pub fn index(self) -> i32 {
        match self {
            Step::C => 0,
            Step::D => 1,
            Step::E => 2,
            Step::F => 3,
            Step::G => 4,
            Step::A => 5,
            Step::B => 6,
        }
    }

    /// Parse a MusicXML `<step>` value (case-insensitive).
    pub fn from_name(name: &str) -> Option<Step> {
        match name.trim().to_ascii_uppercase().as_str() {
            "C" => Some(Step::C),
            "D" => Some(Step::D),
            "E" => Some(Step::E),
            "F" => Some(Step::F),
            "G" => Some(Step::G),
            "A" => Some(Step::A),
            "B" => Some(Step::B),
            _ => None,
        }
    }
}

/// Diatonic pitch number: `octave * 7 + step_index`.
pub fn pitch_number(step: Step, octave: i32) -> i32 {
    octave * 7 + step.index()
}

/// Clamp a chromatic alteration to the double-flat … double-sharp range.
///
/// Microtonal values round to the nearest semitone.
pub fn normalize_alter(alter: Option<f64>) -> i8 {
    match alter {
        Some(a) if a.is_finite() => a.round().clamp(-2.0, 2.0) as i8,
        _ => 0,
    }
}

/// Accidental glyph drawn for an alteration, if any.
pub fn accidental_glyph(alter: i8) -> Option<&'static str> {
    match alter {
        -2 => Some("\u{1D12B}"),
        -1 => Some("\u{266D}"),
        1 => Some("\u{266F}"),
        2 => Some("\u{1D12A}"),
        _ => None,
    }
}

// ── Clef ────────────────────────────────────────────────────────────

/// Clef sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClefSign {
    G,
    F,
    C,
}

/// A resolved clef: sign, staff line (1 = bottom), octave transposition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClefInfo {
    pub sign: ClefSign,
    pub line: i32,
    pub octave_change: i32,
}

impl ClefInfo {
    /// Plain treble clef.
    pub const TREBLE: ClefInfo = ClefInfo { sign: ClefSign::G, line: 2, octave_change: 0 };
    /// Treble clef sounding an octave lower (guitar "8vb").
    pub const TREBLE_8VB: ClefInfo = ClefInfo { sign: ClefSign::G, line: 2, octave_change: -1 };
    /// Bass clef on line 4.
    pub const BASS: ClefInfo = ClefInfo { sign: ClefSign::F, line: 4, octave_change: 0 };

    /// Build from MusicXML clef fields. Unknown signs fall back to G on line 2.
    pub fn from_parts(sign: &str, line: Option<i32>, octave_change: Option<i32>) -> ClefInfo {
        let (sign, default_line) = match sign.trim() {
            "F" => (ClefSign::F, 4),
            "C" => (ClefSign::C, 3),
            _ => (ClefSign::G, 2),
        };
        ClefInfo {
            sign,
            line: line.filter(|l| (1..=5).contains(l)).unwrap_or(default_line),
            octave_change: octave_change.unwrap_or(0).clamp(-1, 1),
        }
    }

    /// Pitch number of the pitch that sits on the clef's line.
    pub fn reference_pitch(&self) -> i32 {
        let base = match self.sign {
            ClefSign::G => pitch_number(Step::G, 4),
            ClefSign::F => pitch_number(Step::F, 3),
            ClefSign::C => pitch_number(Step::C, 4),
        };
        base + 7 * self.octave_change
    }

    /// Offset of the clef's line below the staff top, in tenths.
    pub fn reference_offset(&self) -> f64 {
        (5 - self.line) as f64 * STAFF_SPACE
    }

    /// Vertical offset of a pitch from the staff top (tenths, positive = down).
    pub fn staff_offset(&self, step: Step, octave: i32) -> f64 {
        let steps = pitch_number(step, octave) - self.reference_pitch();
        self.reference_offset() - steps as f64 * DIATONIC_STEP
    }
}

impl Default for ClefInfo {
    fn default() -> Self {
        ClefInfo::TREBLE
    }
}

// ── Duration ────────────────────────────────────────────────────────

/// Notated duration class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DurationClass {
    #[serde(rename = "whole")]
    Whole,
    #[serde(rename = "half")]
    Half,
    #[serde(rename = "quarter")]
    Quarter,
    #[serde(rename = "eighth")]
    Eighth,
    #[serde(rename = "16th")]
    Sixteenth,
    #[serde(rename = "32nd")]
    ThirtySecond,
    #[serde(rename = "64th")]
    SixtyFourth,
}

/// Shape of a note head.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeadShape {
    /// Hollow (whole and half notes)
    Open,
    /// Solid
    Filled,
}

impl DurationClass {
    /// Parse a MusicXML `<type>` value. Returns `None` for anything outside
    /// the supported whole … 64th range.
    pub fn from_name(name: &str) -> Option<DurationClass> {
        match name.trim() {
            "whole" => Some(DurationClass::Whole),
            "half" => Some(DurationClass::Half),
            "quarter" => Some(DurationClass::Quarter),
            "eighth" => Some(DurationClass::Eighth),
            "16th" => Some(DurationClass::Sixteenth),
            "32nd" => Some(DurationClass::ThirtySecond),
            "64th" => Some(DurationClass::SixtyFourth),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            DurationClass::Whole => "whole",
            DurationClass::Half => "half",
            DurationClass::Quarter => "quarter",
            DurationClass::Eighth => "eighth",
            DurationClass::Sixteenth => "16th",
            DurationClass::ThirtySecond => "32nd",
            DurationClass::SixtyFourth => "64th",
        }
    }

    pub fn flag_count(self) -> usize {
        match self {
            DurationClass::Whole | DurationClass::Half | DurationClass::Quarter => 0,
            DurationClass::Eighth => 1,
            DurationClass::Sixteenth => 2,
            DurationClass::ThirtySecond => 3,
            DurationClass::SixtyFourth => 4,
        }
    }

    pub fn head_shape(self) -> HeadShape {
        match self {
            DurationClass::Whole | DurationClass::Half => HeadShape::Open,
            _ => HeadShape::Filled,
        }
    }

    /// Duration code understood by the VexFlow engraver used for the clean panel.
    pub fn vexflow_code(self) -> &'static str {
        match self {
            DurationClass::Whole => "w",
            DurationClass::Half => "h",
            DurationClass::Quarter => "q",
            DurationClass::Eighth => "8",
            DurationClass::Sixteenth => "16",
            DurationClass::ThirtySecond => "32",
            DurationClass::SixtyFourth => "64",
        }
    }
}

// ── Stem ────────────────────────────────────────────────────────────

/// Stem direction of a rendered note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StemDirection {
    Up,
    Down,
    None,
}

impl StemDirection {
    /// Resolve the stem for a note. Whole notes never have a stem; other
    /// durations follow the hint, with anything unrecognized meaning none.
    pub fn resolve(hint: Option<&str>, duration: DurationClass) -> StemDirection {
        if duration == DurationClass::Whole {
            return StemDirection::None;
        }
        match hint.map(str::trim) {
            Some("up") => StemDirection::Up,
            Some("down") => StemDirection::Down,
            _ => StemDirection::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn treble_8vb_matches_guitar_constant() {
        for octave in 1..7 {
            for step in [Step::C, Step::D, Step::E, Step::F, Step::G, Step::A, Step::B] {
                let p = pitch_number(step, octave);
                let expected = 155.0 - 5.0 * p as f64;
                assert_eq!(ClefInfo::TREBLE_8VB.staff_offset(step, octave), expected);
            }
        }
    }

    #[test]
    fn bass_matches_bass_constant() {
        for octave in 1..7 {
            for step in [Step::C, Step::D, Step::E, Step::F, Step::G, Step::A, Step::B] {
                let p = pitch_number(step, octave);
                let expected = 130.0 - 5.0 * p as f64;
                assert_eq!(ClefInfo::BASS.staff_offset(step, octave), expected);
            }
        }
    }

    #[test]
    fn treble_lines() {
        // E4 bottom line, F5 top line
        assert_eq!(ClefInfo::TREBLE.staff_offset(Step::E, 4), 40.0);
        assert_eq!(ClefInfo::TREBLE.staff_offset(Step::F, 5), 0.0);
        // Alto clef: C4 on the middle line
        let alto = ClefInfo::from_parts("C", None, None);
        assert_eq!(alto.staff_offset(Step::C, 4), 20.0);
    }

    #[test]
    fn clef_from_parts_defaults() {
        assert_eq!(ClefInfo::from_parts("F", None, None), ClefInfo::BASS);
        assert_eq!(ClefInfo::from_parts("G", Some(2), Some(-1)), ClefInfo::TREBLE_8VB);
        assert_eq!(ClefInfo::from_parts("percussion", Some(9), None), ClefInfo::TREBLE);
    }

    #[test]
    fn duration_tables() {
        let all = [
            (DurationClass::Whole, 0, HeadShape::Open),
            (DurationClass::Half, 0, HeadShape::Open),
            (DurationClass::Quarter, 0, HeadShape::Filled),
            (DurationClass::Eighth, 1, HeadShape::Filled),
            (DurationClass::Sixteenth, 2, HeadShape::Filled),
            (DurationClass::ThirtySecond, 3, HeadShape::Filled),
            (DurationClass::SixtyFourth, 4, HeadShape::Filled),
        ];
        for (d, flags, shape) in all {
            assert_eq!(d.flag_count(), flags, "{}", d.name());
            assert_eq!(d.head_shape(), shape, "{}", d.name());
            assert_eq!(DurationClass::from_name(d.name()), Some(d));
        }
        assert_eq!(DurationClass::from_name("breve"), None);
        assert_eq!(DurationClass::Half.vexflow_code(), "h");
        assert_eq!(DurationClass::Sixteenth.vexflow_code(), "16");
    }

    #[test]
    fn whole_notes_lose_their_stem() {
        assert_eq!(StemDirection::resolve(Some("up"), DurationClass::Whole), StemDirection::None);
        assert_eq!(StemDirection::resolve(Some("down"), DurationClass::Half), StemDirection::Down);
        assert_eq!(StemDirection::resolve(Some("double"), DurationClass::Quarter), StemDirection::None);
        assert_eq!(StemDirection::resolve(None, DurationClass::Eighth), StemDirection::None);
    }

    #[test]
    fn alter_is_clamped() {
        assert_eq!(normalize_alter(Some(-1.0)), -1);
        assert_eq!(normalize_alter(Some(3.0)), 2);
        assert_eq!(normalize_alter(Some(0.5)), 1);
        assert_eq!(normalize_alter(None), 0);
        assert_eq!(accidental_glyph(0), None);
        assert!(accidental_glyph(-2).is_some());
    }
}
