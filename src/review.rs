//! Review session: user corrections held as a sparse overlay over the
//! immutable note list.
//!
//! Base records are never touched. A correction is stored per note id and
//! merged in whenever a note is read; dropping the entry restores the
//! recognized value.

use std::borrow::Cow;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::layout::ScoreLayout;
use crate::pitch::{ClefInfo, DurationClass, StemDirection, Step};
use crate::records::{NoteRecord, OverlayScore, ReviewStatus};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReviewError {
    #[error("no note with id '{0}' in the loaded score")]
    UnknownNote(String),
}

/// Per-note override. `None` fields keep the recognized value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Correction {
    pub step: Option<Step>,
    pub octave: Option<i32>,
    pub alter: Option<i8>,
    pub duration: Option<DurationClass>,
    pub status: ReviewStatus,
}

impl Correction {
    /// Mark a note as correct without changing it.
    pub fn verified() -> Self {
        Self {
            step: None,
            octave: None,
            alter: None,
            duration: None,
            status: ReviewStatus::Verified,
        }
    }

    /// An empty override with status `Corrected`; fill in fields as needed.
    pub fn corrected() -> Self {
        Self {
            status: ReviewStatus::Corrected,
            ..Self::verified()
        }
    }

    pub fn has_overrides(&self) -> bool {
        self.step.is_some() || self.octave.is_some() || self.alter.is_some() || self.duration.is_some()
    }
}

/// Merge a correction over a base record.
///
/// Pitch-dependent geometry is recomputed with the same layout law the
/// parser used; the horizontal position never changes.
pub fn apply_correction(
    base: &NoteRecord,
    correction: &Correction,
    layout: &ScoreLayout,
    clef: &ClefInfo,
) -> NoteRecord {
    let step = correction.step.unwrap_or(base.step);
    let octave = correction.octave.unwrap_or(base.octave);
    let duration = correction.duration.unwrap_or(base.duration);
    let stem = if duration == DurationClass::Whole {
        StemDirection::None
    } else {
        base.stem
    };

    NoteRecord {
        step,
        octave,
        alter: correction.alter.map_or(base.alter, |a| a.clamp(-2, 2)),
        duration,
        stem,
        absolute_y: layout.staff_top(base.system_index, base.part_index)
            + clef.staff_offset(step, octave),
        review_status: correction.status,
        ..base.clone()
    }
}

/// The loaded overlay plus the user's corrections.
#[derive(Debug, Clone)]
pub struct ReviewSession {
    overlay: OverlayScore,
    corrections: HashMap<String, Correction>,
}

impl ReviewSession {
    pub fn new(overlay: OverlayScore) -> Self {
        Self {
            overlay,
            corrections: HashMap::new(),
        }
    }

    /// Replace the loaded score. All corrections are discarded.
    pub fn load(&mut self, overlay: OverlayScore) {
        self.overlay = overlay;
        self.corrections.clear();
    }

    /// The unmodified base records.
    pub fn overlay(&self) -> &OverlayScore {
        &self.overlay
    }

    pub fn correction(&self, id: &str) -> Option<&Correction> {
        self.corrections.get(id)
    }

    pub fn correction_count(&self) -> usize {
        self.corrections.len()
    }

    /// Store (or replace) the correction for a note.
    pub fn correct(&mut self, id: &str, correction: Correction) -> Result<(), ReviewError> {
        self.ensure_known(id)?;
        log::debug!("note {id}: correction recorded ({:?})", correction.status);
        self.corrections.insert(id.to_string(), correction);
        Ok(())
    }

    /// Mark a note verified. A note that already carries overrides keeps
    /// them and stays `Corrected`.
    pub fn verify(&mut self, id: &str) -> Result<(), ReviewError> {
        self.ensure_known(id)?;
        self.corrections
            .entry(id.to_string())
            .and_modify(|c| {
                if !c.has_overrides() {
                    c.status = ReviewStatus::Verified;
                }
            })
            .or_insert_with(Correction::verified);
        Ok(())
    }

    /// Drop the correction for one note, returning it.
    pub fn reset(&mut self, id: &str) -> Option<Correction> {
        self.corrections.remove(id)
    }

    pub fn reset_all(&mut self) {
        self.corrections.clear();
    }

    /// A note with its correction merged in.
    pub fn effective_note(&self, id: &str) -> Option<Cow<'_, NoteRecord>> {
        let base = self.overlay.note(id)?;
        Some(self.merge(base))
    }

    /// All notes with corrections merged in, in document order.
    pub fn effective_notes(&self) -> Vec<NoteRecord> {
        self.overlay
            .notes
            .iter()
            .map(|n| self.merge(n).into_owned())
            .collect()
    }

    fn merge<'a>(&self, base: &'a NoteRecord) -> Cow<'a, NoteRecord> {
        match self.corrections.get(&base.id) {
            None => Cow::Borrowed(base),
            Some(c) => {
                let clef = self
                    .overlay
                    .parts
                    .get(base.part_index)
                    .map(|p| p.clef)
                    .unwrap_or_default();
                Cow::Owned(apply_correction(base, c, &self.overlay.layout, &clef))
            }
        }
    }

    fn ensure_known(&self, id: &str) -> Result<(), ReviewError> {
        match self.overlay.note(id) {
            Some(_) => Ok(()),
            None => Err(ReviewError::UnknownNote(id.to_string())),
        }
    }
}
