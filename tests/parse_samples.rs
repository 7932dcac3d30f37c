//! Integration tests — load the fixture score and check the flat note list.

use pretty_assertions::assert_eq;
use scoreoverlay::records::TimeInfo;
use scoreoverlay::{
    find_nearest, load_overlay, load_overlay_file, load_overlay_with_layout, overlay_to_json,
    parse_bytes, parse_file, Calibration, ClefInfo, DurationClass, OverlayScore, ParseError,
    ScoreLayout, StemDirection, Step,
};
use scoreoverlay::mxl::extract_musicxml_from_mxl;
use std::collections::HashSet;
use std::io::{Cursor, Write};
use std::path::PathBuf;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

fn fixture_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn load_trio() -> OverlayScore {
    load_overlay_file(fixture_dir().join("trio.musicxml")).expect("Failed to load trio.musicxml")
}

fn note<'a>(overlay: &'a OverlayScore, id: &str) -> &'a scoreoverlay::NoteRecord {
    overlay
        .note(id)
        .unwrap_or_else(|| panic!("note {id} missing"))
}

// ─── Document model ─────────────────────────────────────────────────

#[test]
fn parse_trio_document_model() {
    let score = parse_file(fixture_dir().join("trio.musicxml")).expect("Failed to parse trio");
    assert_eq!(score.title.as_deref(), Some("Trio Study"));
    assert_eq!(score.version.as_deref(), Some("3.1"));
    assert_eq!(score.parts.len(), 3);
    assert_eq!(score.parts[0].abbreviation.as_deref(), Some("Gtr. 1"));
    assert_eq!(score.measure_count(), 8);
    assert!(score.parts[0].measures[4].new_system);
    let defaults = score.defaults.as_ref().expect("defaults");
    assert_eq!(defaults.page_width, Some(1305.0));
    assert_eq!(defaults.staff_distance, Some(75.0));
}

#[test]
fn layout_from_document_matches_reference() {
    let score = parse_file(fixture_dir().join("trio.musicxml")).unwrap();
    assert_eq!(ScoreLayout::from_score(&score), ScoreLayout::reference());
}

// ─── Flat note list ─────────────────────────────────────────────────

#[test]
fn rests_and_pitchless_notes_are_excluded() {
    let overlay = load_trio();
    // 6 + 1 + 2 pitched notes; 2 rests and 1 unpitched note dropped
    assert_eq!(overlay.notes.len(), 9);
    assert!(overlay.notes.iter().all(|n| !n.is_rest));
    assert!(overlay.note("p0-m0-n2").is_none(), "rest must not be listed");
    assert!(overlay.note("p0-m5-n0").is_none(), "unpitched note must be dropped");
}

#[test]
fn note_positions_follow_layout_law() {
    let overlay = load_trio();

    // Guitar (G clef 8vb): offset = 155 - 5p, staff top 230
    let c4 = note(&overlay, "p0-m0-n0");
    assert_eq!((c4.absolute_x, c4.absolute_y), (150.0, 245.0));
    assert_eq!(c4.stem, StemDirection::Up);

    let e4 = note(&overlay, "p0-m0-n1");
    assert_eq!((e4.absolute_x, e4.absolute_y), (210.0, 235.0));
    assert_eq!(e4.duration, DurationClass::Eighth);

    let g4 = note(&overlay, "p0-m0-n3");
    assert_eq!((g4.absolute_x, g4.absolute_y), (330.0, 225.0));
    assert_eq!(g4.stem, StemDirection::Down);

    // Measure 2 starts after measure 1's width
    let d4 = note(&overlay, "p0-m1-n0");
    assert_eq!((d4.absolute_x, d4.absolute_y), (452.0, 240.0));

    // Measure 5 is the first of system 1: widths reset
    let a4 = note(&overlay, "p0-m4-n0");
    assert_eq!(a4.system_index, 1);
    assert_eq!((a4.absolute_x, a4.absolute_y), (180.0, 640.0));

    let b3 = note(&overlay, "p1-m0-n0");
    assert_eq!((b3.absolute_x, b3.absolute_y), (150.0, 365.0));

    // Bass (F clef line 4): offset = 130 - 5p, staff top 460
    let bass_c4 = note(&overlay, "p2-m0-n0");
    assert_eq!((bass_c4.absolute_x, bass_c4.absolute_y), (150.0, 450.0));
    let bass_e2 = note(&overlay, "p2-m4-n0");
    assert_eq!((bass_e2.absolute_x, bass_e2.absolute_y), (150.0, 930.0));
}

#[test]
fn whole_notes_drop_stems_and_unknown_types_become_quarters() {
    let overlay = load_trio();
    let whole = note(&overlay, "p0-m1-n0");
    assert_eq!(whole.duration, DurationClass::Whole);
    assert_eq!(whole.stem, StemDirection::None);

    let breve = note(&overlay, "p0-m3-n0");
    assert_eq!(breve.duration, DurationClass::Quarter);
    assert_eq!(breve.step, Step::F);
    assert_eq!(breve.alter, 1);
    assert_eq!(breve.stem, StemDirection::None);
}

#[test]
fn part_metadata() {
    let overlay = load_trio();
    assert_eq!(overlay.parts.len(), 3);

    let gtr = &overlay.parts[0];
    assert_eq!(gtr.name, "Guitar 1");
    assert_eq!(gtr.clef, ClefInfo::TREBLE_8VB);
    assert_eq!(gtr.key.fifths, 1);
    assert_eq!(gtr.time, TimeInfo::Metered { beats: 3, beat_type: 4 });

    // No key/time in the first measure: defaults
    let gtr2 = &overlay.parts[1];
    assert_eq!(gtr2.key.fifths, 0);
    assert_eq!(gtr2.key.mode, "major");
    assert_eq!(gtr2.time, TimeInfo::Metered { beats: 4, beat_type: 4 });

    let bass = &overlay.parts[2];
    assert_eq!(bass.clef, ClefInfo::BASS);
    assert_eq!(bass.time, TimeInfo::FreeTime);
}

#[test]
fn ids_are_unique() {
    let overlay = load_trio();
    let ids: HashSet<&str> = overlay.notes.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids.len(), overlay.notes.len());
}

#[test]
fn loading_twice_is_identical() {
    let first = load_trio();
    let second = load_trio();
    assert_eq!(first, second);
    for (a, b) in first.notes.iter().zip(&second.notes) {
        assert_eq!(a.confidence.to_bits(), b.confidence.to_bits());
    }
}

#[test]
fn rests_are_not_reachable_by_hit_testing() {
    let overlay = load_trio();
    let (w, h) = overlay.page_size();
    // The rest in measure 1 has no position; sweep the whole first staff
    // band and make sure every hit is a listed (non-rest) note.
    let mut x = 130.0;
    while x < 1236.0 {
        if let Some(hit) = find_nearest(
            &overlay.layout,
            &overlay.notes,
            x,
            250.0,
            w,
            h,
            &Calibration::IDENTITY,
            18.0,
        ) {
            assert!(!hit.is_rest);
            assert!(overlay.note(&hit.id).is_some());
        }
        x += 5.0;
    }
}

// ─── Error handling ─────────────────────────────────────────────────

#[test]
fn missing_root_wrapper_is_fatal() {
    let xml = r#"<?xml version="1.0"?><score><part id="P1"/></score>"#;
    match load_overlay(xml) {
        Err(ParseError::UnsupportedRoot(root)) => assert_eq!(root, "score"),
        other => panic!("expected fatal root error, got {other:?}"),
    }
}

#[test]
fn missing_file_is_io_error() {
    let err = parse_file(fixture_dir().join("does-not-exist.musicxml")).unwrap_err();
    assert!(matches!(err, ParseError::Io { .. }), "{err}");
}

#[test]
fn parse_bytes_detects_xml() {
    let data = std::fs::read(fixture_dir().join("trio.musicxml")).unwrap();
    let score = parse_bytes(&data, None).expect("auto-detect XML");
    assert_eq!(score.parts.len(), 3);
    assert!(parse_bytes(b"PK\x03\x04garbage", None).is_err());
}

// ─── Compressed MXL ─────────────────────────────────────────────────

const CONTAINER_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<container>
  <rootfiles>
    <rootfile full-path="score.xml" media-type="application/vnd.recordare.musicxml+xml"/>
  </rootfiles>
</container>"#;

fn trio_xml() -> String {
    std::fs::read_to_string(fixture_dir().join("trio.musicxml")).unwrap()
}

/// Deflated in-memory archive with the given entries, in order.
fn build_mxl(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    for (name, content) in entries {
        writer.start_file(*name, options).unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

#[test]
fn mxl_root_file_from_container() {
    let trio = trio_xml();
    let data = build_mxl(&[
        ("mimetype", "application/vnd.recordare.musicxml"),
        ("META-INF/container.xml", CONTAINER_XML),
        ("aaa-decoy.xml", "<score-partwise/>"),
        ("score.xml", &trio),
    ]);

    assert_eq!(extract_musicxml_from_mxl(&data).unwrap(), trio);
    let score = parse_bytes(&data, Some("mxl")).expect("parse mxl");
    assert_eq!(score.parts.len(), 3);
    assert_eq!(score.measure_count(), 8);
    println!("  ✓ mxl via container.xml: {} parts", score.parts.len());
}

#[test]
fn mxl_without_container_uses_first_musicxml_entry() {
    let trio = trio_xml();
    let data = build_mxl(&[
        ("mimetype", "application/vnd.recordare.musicxml"),
        ("META-INF/manifest.xml", "<manifest/>"),
        ("cover.png", "not an image"),
        ("trio.musicxml", &trio),
    ]);

    // no hint: the archive is sniffed
    let score = parse_bytes(&data, None).expect("parse sniffed mxl");
    assert_eq!(score.parts.len(), 3);
    assert_eq!(score.title.as_deref(), Some("Trio Study"));
}

#[test]
fn mxl_archive_errors() {
    let no_rootfile = build_mxl(&[
        ("META-INF/container.xml", "<container><rootfiles/></container>"),
        ("score.xml", "<score-partwise/>"),
    ]);
    match extract_musicxml_from_mxl(&no_rootfile) {
        Err(ParseError::Archive(msg)) => assert!(msg.contains("no rootfile"), "{msg}"),
        other => panic!("expected archive error, got {other:?}"),
    }

    let no_score = build_mxl(&[("readme.txt", "nothing here")]);
    match extract_musicxml_from_mxl(&no_score) {
        Err(ParseError::Archive(msg)) => assert!(msg.contains("no MusicXML file"), "{msg}"),
        other => panic!("expected archive error, got {other:?}"),
    }

    let dangling = build_mxl(&[("META-INF/container.xml", CONTAINER_XML)]);
    assert!(matches!(
        extract_musicxml_from_mxl(&dangling),
        Err(ParseError::Archive(_))
    ));
}

// ─── Bass-clef scenario ─────────────────────────────────────────────

#[test]
fn bass_clef_middle_c_sits_one_space_above_staff() {
    let xml = r#"<score-partwise>
      <part-list><score-part id="P1"><part-name>Bass</part-name></score-part></part-list>
      <part id="P1">
        <measure number="1" width="100">
          <attributes><clef><sign>F</sign><line>4</line></clef></attributes>
          <note default-x="20">
            <pitch><step>C</step><octave>4</octave></pitch>
            <duration>1</duration><type>quarter</type>
          </note>
        </measure>
      </part>
    </score-partwise>"#;
    let layout = ScoreLayout {
        systems: vec![scoreoverlay::layout::SystemGeometry {
            left_margin: 130.0,
            measure_widths: vec![100.0],
            staff_tops: vec![200.0],
        }],
        ..ScoreLayout::reference()
    };

    let overlay = load_overlay_with_layout(xml, &layout).unwrap();
    assert_eq!(overlay.notes.len(), 1);
    let c4 = &overlay.notes[0];
    assert_eq!(c4.absolute_x, 150.0);
    assert_eq!(c4.absolute_y, 200.0 - 10.0);
    // Above the staff top, one staff space out: the middle-C ledger line
    assert!(c4.absolute_y < layout.staff_top(0, 0));
}

#[test]
fn json_export_contains_notes_and_layout() {
    let overlay = load_trio();
    let json = overlay_to_json(&overlay).unwrap();
    assert!(json.contains("\"p0-m0-n0\""));
    assert!(json.contains("\"page_width\""));
    assert!(json.contains("\"eighth\""));
}
