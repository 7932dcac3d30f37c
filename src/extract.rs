//! Flattening: walks the Score document model into positioned note records.
//!
//! Traversal order is fixed: parts in document order, measures in document
//! order (global index), notes in document order. Every coordinate is a pure
//! function of the document and the layout, so loading the same document
//! twice yields identical records.

use crate::layout::ScoreLayout;
use crate::model::*;
use crate::pitch::{normalize_alter, ClefInfo, DurationClass, StemDirection, Step};
use crate::records::*;

/// Flatten a parsed score into overlay records using the given layout.
///
/// Measures or parts the layout has no geometry for are skipped with a
/// warning; they cannot be positioned.
pub fn build_overlay(score: &Score, layout: &ScoreLayout) -> OverlayScore {
    let parts: Vec<PartInfo> = score.parts.iter().map(part_info).collect();
    let mut notes = Vec::new();

    for (part_index, part) in score.parts.iter().enumerate() {
        if part_index >= layout.part_count() {
            log::warn!(
                "part {part_index} ('{}') has no staff position in the layout; skipped",
                part.id
            );
            continue;
        }
        let clef = parts[part_index].clef;

        for (measure_index, measure) in part.measures.iter().enumerate() {
            if measure_index >= layout.total_measures() {
                log::warn!(
                    "part {part_index}: measures from index {measure_index} exceed the layout; skipped"
                );
                break;
            }
            collect_measure(&mut notes, layout, &clef, part_index, measure_index, measure);
        }
    }

    log::info!(
        "overlay built: {} notes across {} parts, {} measures",
        notes.len(),
        parts.len(),
        score.measure_count()
    );

    OverlayScore {
        notes,
        layout: layout.clone(),
        parts,
    }
}

fn collect_measure(
    out: &mut Vec<NoteRecord>,
    layout: &ScoreLayout,
    clef: &ClefInfo,
    part_index: usize,
    measure_index: usize,
    measure: &Measure,
) {
    let start_x = layout.measure_start_x(measure_index);
    let system_index = layout.system_of(measure_index);
    let staff_top = layout.staff_top(system_index, part_index);

    for (note_index, note) in measure.notes.iter().enumerate() {
        if note.rest {
            continue;
        }
        let id = note_id(part_index, measure_index, note_index);

        // One staff per part: lower staves of a grand staff have no position
        if note.staff.is_some_and(|s| s > 1) {
            log::warn!("note {id} is on staff {:?} of a multi-staff part; dropped", note.staff);
            continue;
        }

        let Some(pitch) = note.pitch.as_ref() else {
            log::warn!("note {id} has no pitch; dropped");
            continue;
        };
        let Some(step) = Step::from_name(&pitch.step) else {
            log::warn!("note {id} has unknown step '{}'; dropped", pitch.step);
            continue;
        };

        let duration = normalize_duration(note.note_type.as_deref(), &id);

        out.push(NoteRecord {
            step,
            octave: pitch.octave,
            alter: normalize_alter(pitch.alter),
            duration,
            stem: StemDirection::resolve(note.stem.as_deref(), duration),
            absolute_x: start_x + note.default_x.unwrap_or(0.0),
            absolute_y: staff_top + clef.staff_offset(step, pitch.octave),
            part_index,
            measure_index,
            system_index,
            note_index,
            is_rest: false,
            confidence: mock_confidence(part_index, measure_index, note_index),
            review_status: ReviewStatus::Unreviewed,
            id,
        });
    }
}

/// Missing or unrecognized duration types become quarters. This is a
/// data-quality signal, not an error.
fn normalize_duration(note_type: Option<&str>, id: &str) -> DurationClass {
    match note_type.and_then(DurationClass::from_name) {
        Some(d) => d,
        None => {
            log::debug!("note {id}: duration type {note_type:?} normalized to quarter");
            DurationClass::Quarter
        }
    }
}

/// Per-part metadata from the first measure's attributes, with defaults
/// G clef on line 2, no accidentals (major), 4/4.
pub fn part_info(part: &Part) -> PartInfo {
    let attrs = part.measures.first().and_then(|m| m.attributes.as_ref());

    let clef = attrs
        .and_then(|a| a.clefs.iter().find(|c| c.number == 1).or(a.clefs.first()))
        .map(|c| ClefInfo::from_parts(&c.sign, Some(c.line), c.octave_change))
        .unwrap_or_default();

    let key = attrs
        .and_then(|a| a.key.as_ref())
        .map(|k| KeyInfo {
            fifths: k.fifths.clamp(-7, 7),
            mode: k.mode.clone().unwrap_or_else(|| "major".to_string()),
        })
        .unwrap_or_default();

    let time = attrs
        .and_then(|a| a.time.as_ref())
        .map(|t| {
            if t.senza_misura {
                TimeInfo::FreeTime
            } else {
                TimeInfo::Metered { beats: t.beats, beat_type: t.beat_type }
            }
        })
        .unwrap_or_default();

    PartInfo {
        name: part.name.clone(),
        clef,
        key,
        time,
    }
}

// ── Placeholder confidence ──────────────────────────────────────────

/// Deterministic stand-in for a recognizer's confidence, in [0.52, 1.0].
///
/// A uniform draw `r ∈ [0, 1)` from an integer hash of the three indices,
/// skewed toward the high end as `0.52 + 0.48 * r^0.55`. The hash constants
/// carry no meaning beyond reproducibility.
pub fn mock_confidence(part_index: usize, measure_index: usize, note_index: usize) -> f64 {
    let seed = (part_index as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
        ^ (measure_index as u64).wrapping_mul(0xC2B2_AE3D_27D4_EB4F)
        ^ (note_index as u64).wrapping_mul(0x1656_67B1_9E37_79F9);
    let r = (mix64(seed) >> 11) as f64 / (1u64 << 53) as f64;
    0.52 + 0.48 * r.powf(0.55)
}

/// SplitMix64 finalizer.
fn mix64(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
