//! Score layout model — fixed page geometry in tenths.
//!
//! A layout is configuration data: page size, and for each system the left
//! margin, the widths of its measures, and the staff top of every part.
//! Two rules govern how it is read:
//!
//! - measure `i` belongs to system `i / measures_per_system`;
//! - a measure starts at its system's left margin plus the widths of the
//!   measures before it *in the same system* (widths reset per system).

use serde::{Deserialize, Serialize};

use crate::model::{Measure, Score, SystemLayout};
use crate::pitch::{ClefInfo, Step, STAFF_SPACE};

/// Height of a five-line staff in tenths (4 staff spaces).
pub const STAFF_HEIGHT: f64 = 4.0 * STAFF_SPACE;

// ── Reference engraving values ──────────────────────────────────────
// Used by `ScoreLayout::reference()` and as fallbacks when a document
// omits its engraving defaults.
pub const DEFAULT_MEASURES_PER_SYSTEM: usize = 4;
pub const DEFAULT_PAGE_WIDTH: f64 = 1305.0;
pub const DEFAULT_PAGE_HEIGHT: f64 = 1690.0;
pub const DEFAULT_PAGE_LEFT_MARGIN: f64 = 80.0;
pub const DEFAULT_PAGE_TOP_MARGIN: f64 = 80.0;
pub const DEFAULT_SYSTEM_LEFT_MARGIN: f64 = 50.0;
pub const DEFAULT_TOP_SYSTEM_DISTANCE: f64 = 150.0;
pub const DEFAULT_SYSTEM_DISTANCE: f64 = 150.0;
pub const DEFAULT_STAFF_DISTANCE: f64 = 75.0;
pub const DEFAULT_MEASURE_WIDTH: f64 = 250.0;

const REFERENCE_MEASURE_WIDTHS: [[f64; 4]; 2] = [
    [292.0, 226.0, 295.0, 293.0],
    [378.0, 306.0, 340.0, 83.0],
];
const REFERENCE_PART_COUNT: usize = 3;

/// Geometry of one system (one line of staves).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemGeometry {
    /// X of the first measure's left edge, tenths from the page's left edge
    pub left_margin: f64,
    /// Widths of the measures in this system, in order
    pub measure_widths: Vec<f64>,
    /// Staff top Y per part index, tenths from the page top
    pub staff_tops: Vec<f64>,
}

/// Static page geometry for one score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreLayout {
    pub page_width: f64,
    pub page_height: f64,
    pub staff_height: f64,
    pub measures_per_system: usize,
    pub systems: Vec<SystemGeometry>,
}

impl ScoreLayout {
    /// Layout of the reference score: two systems of four measures, three parts.
    pub fn reference() -> Self {
        let systems = REFERENCE_MEASURE_WIDTHS
            .iter()
            .enumerate()
            .map(|(s, widths)| SystemGeometry {
                left_margin: DEFAULT_PAGE_LEFT_MARGIN + DEFAULT_SYSTEM_LEFT_MARGIN,
                measure_widths: widths.to_vec(),
                staff_tops: stacked_staff_tops(
                    reference_system_top(s),
                    REFERENCE_PART_COUNT,
                    DEFAULT_STAFF_DISTANCE,
                ),
            })
            .collect();

        Self {
            page_width: DEFAULT_PAGE_WIDTH,
            page_height: DEFAULT_PAGE_HEIGHT,
            staff_height: STAFF_HEIGHT,
            measures_per_system: DEFAULT_MEASURES_PER_SYSTEM,
            systems,
        }
    }

    /// Derive the layout from a document's own engraving data.
    ///
    /// Reads page size and margins from `<defaults>`, system breaks and
    /// margins/distances from the `<print>` elements of the first part, and
    /// measure widths from the first part's `width` attributes. Anything
    /// missing falls back to the reference values.
    pub fn from_score(score: &Score) -> Self {
        let defaults = score.defaults.clone().unwrap_or_default();
        let base_system = defaults.system_layout.clone().unwrap_or_default();
        let base_staff_distance = defaults.staff_distance.unwrap_or(DEFAULT_STAFF_DISTANCE);
        let page_left = defaults.left_margin.unwrap_or(DEFAULT_PAGE_LEFT_MARGIN);
        let page_top = defaults.top_margin.unwrap_or(DEFAULT_PAGE_TOP_MARGIN);

        let part_count = score.parts.len().max(1);
        let measures: &[Measure] = score
            .parts
            .first()
            .map(|p| p.measures.as_slice())
            .unwrap_or_default();
        let measures_per_system = detect_measures_per_system(measures);

        let mut systems = Vec::new();
        let mut next_top: Option<f64> = None;
        for chunk in measures.chunks(measures_per_system) {
            let first = &chunk[0];
            let sl = merge_system_layout(&base_system, first.system_layout.as_ref());
            let staff_distance = first.staff_distance.unwrap_or(base_staff_distance);

            let system_top = match next_top {
                None => page_top + sl.top_system_distance.unwrap_or(DEFAULT_TOP_SYSTEM_DISTANCE),
                Some(bottom) => bottom + sl.system_distance.unwrap_or(DEFAULT_SYSTEM_DISTANCE),
            };
            let staff_tops = stacked_staff_tops(system_top, part_count, staff_distance);
            next_top = staff_tops.last().map(|t| t + STAFF_HEIGHT);

            systems.push(SystemGeometry {
                left_margin: page_left + sl.left_margin.unwrap_or(DEFAULT_SYSTEM_LEFT_MARGIN),
                measure_widths: chunk
                    .iter()
                    .map(|m| m.width.unwrap_or(DEFAULT_MEASURE_WIDTH))
                    .collect(),
                staff_tops,
            });
        }

        let layout = Self {
            page_width: defaults.page_width.unwrap_or(DEFAULT_PAGE_WIDTH),
            page_height: defaults.page_height.unwrap_or(DEFAULT_PAGE_HEIGHT),
            staff_height: STAFF_HEIGHT,
            measures_per_system,
            systems,
        };
        log::debug!(
            "derived layout: {} systems of {} measures, {} parts, page {}x{}",
            layout.systems.len(),
            measures_per_system,
            part_count,
            layout.page_width,
            layout.page_height
        );
        layout
    }

    /// Total number of measures described by this layout.
    pub fn total_measures(&self) -> usize {
        self.systems.iter().map(|s| s.measure_widths.len()).sum()
    }

    /// Number of parts with staff positions in the first system.
    pub fn part_count(&self) -> usize {
        self.systems.first().map_or(0, |s| s.staff_tops.len())
    }

    /// System index of a measure.
    pub fn system_of(&self, measure_index: usize) -> usize {
        measure_index / self.measures_per_system.max(1)
    }

    /// Left edge of a measure in tenths.
    ///
    /// # Panics
    /// If `measure_index >= total_measures()`. That is a caller bug.
    pub fn measure_start_x(&self, measure_index: usize) -> f64 {
        let (system, within) = self.locate(measure_index);
        system.left_margin + system.measure_widths[..within].iter().sum::<f64>()
    }

    /// Width of a measure in tenths. Same precondition as `measure_start_x`.
    pub fn measure_width(&self, measure_index: usize) -> f64 {
        let (system, within) = self.locate(measure_index);
        system.measure_widths[within]
    }

    /// Staff top Y (tenths from page top) for a part within a system.
    ///
    /// # Panics
    /// If the system or part is not part of this layout.
    pub fn staff_top(&self, system_index: usize, part_index: usize) -> f64 {
        self.systems[system_index].staff_tops[part_index]
    }

    /// Absolute page position of a note head center.
    pub fn note_position(
        &self,
        part_index: usize,
        measure_index: usize,
        clef: &ClefInfo,
        step: Step,
        octave: i32,
        x_in_measure: f64,
    ) -> (f64, f64) {
        let system = self.system_of(measure_index);
        let x = self.measure_start_x(measure_index) + x_in_measure;
        let y = self.staff_top(system, part_index) + clef.staff_offset(step, octave);
        (x, y)
    }

    fn locate(&self, measure_index: usize) -> (&SystemGeometry, usize) {
        assert!(
            measure_index < self.total_measures(),
            "measure index {measure_index} out of range (layout has {} measures)",
            self.total_measures()
        );
        let system = self.system_of(measure_index);
        (&self.systems[system], measure_index - system * self.measures_per_system)
    }
}

impl Default for ScoreLayout {
    fn default() -> Self {
        Self::reference()
    }
}

fn reference_system_top(system_index: usize) -> f64 {
    let first = DEFAULT_PAGE_TOP_MARGIN + DEFAULT_TOP_SYSTEM_DISTANCE;
    let system_span = (REFERENCE_PART_COUNT as f64) * STAFF_HEIGHT
        + (REFERENCE_PART_COUNT as f64 - 1.0) * DEFAULT_STAFF_DISTANCE
        + DEFAULT_SYSTEM_DISTANCE;
    first + system_index as f64 * system_span
}

fn stacked_staff_tops(system_top: f64, part_count: usize, staff_distance: f64) -> Vec<f64> {
    (0..part_count)
        .map(|p| system_top + p as f64 * (STAFF_HEIGHT + staff_distance))
        .collect()
}

/// Measures in the first system: the index of the first later measure that
/// starts a new system.
fn detect_measures_per_system(measures: &[Measure]) -> usize {
    let detected = measures
        .iter()
        .enumerate()
        .skip(1)
        .find(|(_, m)| m.new_system)
        .map(|(i, _)| i);

    match detected {
        Some(n) => {
            let irregular = measures
                .iter()
                .enumerate()
                .skip(1)
                .any(|(i, m)| m.new_system != (i % n == 0));
            if irregular {
                log::warn!(
                    "system breaks are irregular; assuming {n} measures per system, \
                     later measures may be placed in the wrong system"
                );
            }
            n
        }
        None => DEFAULT_MEASURES_PER_SYSTEM,
    }
}

fn merge_system_layout(base: &SystemLayout, over: Option<&SystemLayout>) -> SystemLayout {
    match over {
        None => base.clone(),
        Some(o) => SystemLayout {
            left_margin: o.left_margin.or(base.left_margin),
            system_distance: o.system_distance.or(base.system_distance),
            top_system_distance: o.top_system_distance.or(base.top_system_distance),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Defaults, Part};

    #[test]
    fn measure_widths_reset_per_system() {
        let layout = ScoreLayout::reference();
        let left = DEFAULT_PAGE_LEFT_MARGIN + DEFAULT_SYSTEM_LEFT_MARGIN;
        assert_eq!(layout.measure_start_x(0), left);
        assert_eq!(layout.measure_start_x(1), left + 292.0);
        assert_eq!(layout.measure_start_x(3), left + 292.0 + 226.0 + 295.0);
        // First measure of system 1 starts back at the margin
        assert_eq!(layout.measure_start_x(4), left);
        assert_eq!(layout.measure_start_x(7), left + 378.0 + 306.0 + 340.0);
        assert_eq!(layout.measure_width(7), 83.0);
    }

    #[test]
    fn system_assignment() {
        let layout = ScoreLayout::reference();
        assert_eq!(layout.total_measures(), 8);
        assert_eq!(layout.part_count(), 3);
        for m in 0..4 {
            assert_eq!(layout.system_of(m), 0);
        }
        for m in 4..8 {
            assert_eq!(layout.system_of(m), 1);
        }
    }

    #[test]
    fn reference_staff_tops() {
        let layout = ScoreLayout::reference();
        assert_eq!(layout.staff_top(0, 0), 230.0);
        assert_eq!(layout.staff_top(0, 1), 345.0);
        assert_eq!(layout.staff_top(0, 2), 460.0);
        assert_eq!(layout.staff_top(1, 0), 650.0);
        assert_eq!(layout.staff_top(1, 2), 880.0);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn out_of_range_measure_panics() {
        ScoreLayout::reference().measure_start_x(8);
    }

    #[test]
    fn from_score_without_engraving_data_matches_reference() {
        let widths = REFERENCE_MEASURE_WIDTHS.concat();
        let part = |id: &str| Part {
            id: id.to_string(),
            name: String::new(),
            abbreviation: None,
            measures: widths
                .iter()
                .map(|w| Measure { width: Some(*w), ..Default::default() })
                .collect(),
        };
        let score = Score {
            parts: vec![part("P1"), part("P2"), part("P3")],
            ..Default::default()
        };
        assert_eq!(ScoreLayout::from_score(&score), ScoreLayout::reference());
    }

    #[test]
    fn irregular_breaks_chunk_by_the_first() {
        let mut measures: Vec<Measure> = (0..7).map(|_| Measure::default()).collect();
        measures[2].new_system = true;
        measures[3].new_system = true;
        assert_eq!(detect_measures_per_system(&measures), 2);
        assert_eq!(detect_measures_per_system(&measures[..2]), DEFAULT_MEASURES_PER_SYSTEM);
    }

    #[test]
    fn from_score_reads_engraving_defaults() {
        let mut measures: Vec<Measure> = (0..5)
            .map(|_| Measure { width: Some(100.0), ..Default::default() })
            .collect();
        measures[3].new_system = true;
        measures[3].system_layout = Some(SystemLayout {
            left_margin: Some(10.0),
            system_distance: Some(200.0),
            ..Default::default()
        });
        let score = Score {
            defaults: Some(Defaults {
                page_width: Some(1200.0),
                page_height: Some(1700.0),
                left_margin: Some(70.0),
                top_margin: Some(60.0),
                system_layout: Some(SystemLayout {
                    left_margin: Some(30.0),
                    top_system_distance: Some(100.0),
                    ..Default::default()
                }),
                staff_distance: Some(60.0),
                ..Default::default()
            }),
            parts: vec![
                Part { id: "P1".into(), name: String::new(), abbreviation: None, measures },
                Part { id: "P2".into(), name: String::new(), abbreviation: None, measures: vec![] },
            ],
            ..Default::default()
        };

        let layout = ScoreLayout::from_score(&score);
        assert_eq!(layout.page_width, 1200.0);
        assert_eq!(layout.measures_per_system, 3);
        assert_eq!(layout.systems.len(), 2);
        assert_eq!(layout.measure_start_x(0), 100.0);
        assert_eq!(layout.measure_start_x(2), 300.0);
        assert_eq!(layout.measure_start_x(3), 80.0);
        assert_eq!(layout.staff_top(0, 0), 160.0);
        assert_eq!(layout.staff_top(0, 1), 260.0);
        // bottom of system 0 (300) + system distance
        assert_eq!(layout.staff_top(1, 0), 500.0);
    }
}
