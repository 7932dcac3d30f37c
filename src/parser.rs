//! MusicXML parser — converts MusicXML XML into the Score document model.

use roxmltree::{Document, Node};

use crate::error::ParseError;
use crate::model::*;

/// Parse a MusicXML XML string into a Score.
///
/// Fails only when the text is not XML or the root element is not
/// `score-partwise`; everything below the root is parsed leniently.
pub fn parse_musicxml(xml: &str) -> Result<Score, ParseError> {
    // MusicXML files include a DOCTYPE declaration, so we must allow DTDs
    let options = roxmltree::ParsingOptions {
        allow_dtd: true,
        ..Default::default()
    };
    let doc = Document::parse_with_options(xml, options)?;
    let root = doc.root_element();

    if root.tag_name().name() != "score-partwise" {
        return Err(ParseError::UnsupportedRoot(
            root.tag_name().name().to_string(),
        ));
    }

    let mut score = Score::new();
    score.version = root.attribute("version").map(String::from);
    let mut part_list: Vec<Part> = Vec::new();

    for child in root.children().filter(|n| n.is_element()) {
        match child.tag_name().name() {
            "work" => parse_work(&child, &mut score),
            "movement-title" => {
                if score.title.is_none() {
                    score.title = text_of(&child);
                }
            }
            "defaults" => score.defaults = Some(parse_defaults(&child)),
            "part-list" => part_list = parse_part_list(&child),
            "part" => parse_part(&child, &part_list, &mut score),
            _ => {}
        }
    }

    for entry in part_list.iter().filter(|e| !score.parts.iter().any(|p| p.id == e.id)) {
        log::debug!("part-list entry '{}' has no <part> element; ignored", entry.id);
    }

    Ok(score)
}

// ─── Work ────────────────────────────────────────────────────────────

fn parse_work(node: &Node, score: &mut Score) {
    for child in node.children().filter(|n| n.is_element()) {
        if child.tag_name().name() == "work-title" {
            score.title = text_of(&child);
        }
    }
}

// ─── Defaults ────────────────────────────────────────────────────────

fn parse_defaults(node: &Node) -> Defaults {
    let mut defaults = Defaults::default();

    for child in node.children().filter(|n| n.is_element()) {
        match child.tag_name().name() {
            "page-layout" => {
                for pl in child.children().filter(|n| n.is_element()) {
                    match pl.tag_name().name() {
                        "page-height" => defaults.page_height = parse_f64(&pl),
                        "page-width" => defaults.page_width = parse_f64(&pl),
                        "page-margins" => {
                            // Odd/even margin pairs are identical in practice; first wins.
                            if defaults.left_margin.is_some() {
                                continue;
                            }
                            for pm in pl.children().filter(|n| n.is_element()) {
                                match pm.tag_name().name() {
                                    "left-margin" => defaults.left_margin = parse_f64(&pm),
                                    "top-margin" => defaults.top_margin = parse_f64(&pm),
                                    _ => {}
                                }
                            }
                        }
                        _ => {}
                    }
                }
            }
            "system-layout" => defaults.system_layout = Some(parse_system_layout(&child)),
            "staff-layout" => defaults.staff_distance = parse_staff_distance(&child),
            _ => {}
        }
    }

    defaults
}

fn parse_system_layout(node: &Node) -> SystemLayout {
    let mut layout = SystemLayout::default();
    for child in node.children().filter(|n| n.is_element()) {
        match child.tag_name().name() {
            "system-margins" => {
                for sm in child.children().filter(|n| n.is_element()) {
                    match sm.tag_name().name() {
                        "left-margin" => layout.left_margin = parse_f64(&sm),
                        _ => {}
                    }
                }
            }
            "system-distance" => layout.system_distance = parse_f64(&child),
            "top-system-distance" => layout.top_system_distance = parse_f64(&child),
            _ => {}
        }
    }
    layout
}

fn parse_staff_distance(node: &Node) -> Option<f64> {
    node.children()
        .filter(|n| n.is_element())
        .find(|n| n.tag_name().name() == "staff-distance")
        .and_then(|n| parse_f64(&n))
}

// ─── Part List ───────────────────────────────────────────────────────

/// Part names from `<part-list>`. Order comes from the `<part>` elements.
fn parse_part_list(node: &Node) -> Vec<Part> {
    let mut entries = Vec::new();
    for child in node.children().filter(|n| n.is_element()) {
        if child.tag_name().name() == "score-part" {
            let id = child.attribute("id").unwrap_or("").to_string();
            let mut part = Part {
                id,
                name: String::new(),
                abbreviation: None,
                measures: Vec::new(),
            };

            for sp_child in child.children().filter(|n| n.is_element()) {
                match sp_child.tag_name().name() {
                    "part-name" => {
                        part.name = sp_child.text().unwrap_or("").trim().to_string();
                    }
                    "part-abbreviation" => {
                        part.abbreviation = text_of(&sp_child);
                    }
                    _ => {}
                }
            }

            entries.push(part);
        }
    }
    entries
}

// ─── Part (measures) ─────────────────────────────────────────────────

/// Append a `<part>` to the score. Part indices follow `<part>` element
/// order; a repeated id continues the earlier part.
fn parse_part(node: &Node, part_list: &[Part], score: &mut Score) {
    let part_id = node.attribute("id").unwrap_or("").to_string();
    let measures = node
        .children()
        .filter(|n| n.is_element() && n.tag_name().name() == "measure")
        .map(|m| parse_measure(&m));

    if let Some(existing) = score.parts.iter_mut().find(|p| p.id == part_id) {
        existing.measures.extend(measures);
        return;
    }

    // A <part> without a part-list entry still carries notes; keep it.
    let mut part = part_list
        .iter()
        .find(|e| e.id == part_id)
        .cloned()
        .unwrap_or_else(|| Part {
            id: part_id,
            name: String::new(),
            abbreviation: None,
            measures: Vec::new(),
        });
    part.measures = measures.collect();
    score.parts.push(part);
}

// ─── Measure ─────────────────────────────────────────────────────────

fn parse_measure(node: &Node) -> Measure {
    let width = node
        .attribute("width")
        .and_then(|w| w.parse::<f64>().ok());

    let mut measure = Measure {
        width,
        ..Default::default()
    };

    for child in node.children().filter(|n| n.is_element()) {
        match child.tag_name().name() {
            "attributes" => {
                // Mid-measure attribute blocks only refine the first one.
                let attrs = parse_attributes(&child);
                match measure.attributes {
                    None => measure.attributes = Some(attrs),
                    Some(ref mut existing) => merge_attributes(existing, attrs),
                }
            }
            "note" => measure.notes.push(parse_note(&child)),
            "print" => parse_print(&child, &mut measure),
            _ => {}
        }
    }

    measure
}

fn parse_print(node: &Node, measure: &mut Measure) {
    // One page per score: a page break only starts a new system
    if node.attribute("new-system") == Some("yes") || node.attribute("new-page") == Some("yes") {
        measure.new_system = true;
    }
    for child in node.children().filter(|n| n.is_element()) {
        match child.tag_name().name() {
            // A <print> carrying system-layout also implies a system start
            "system-layout" => {
                measure.system_layout = Some(parse_system_layout(&child));
                measure.new_system = true;
            }
            "staff-layout" => measure.staff_distance = parse_staff_distance(&child),
            _ => {}
        }
    }
}

// ─── Attributes ──────────────────────────────────────────────────────

fn parse_attributes(node: &Node) -> Attributes {
    let mut attrs = Attributes::default();

    for child in node.children().filter(|n| n.is_element()) {
        match child.tag_name().name() {
            "key" => attrs.key = Some(parse_key(&child)),
            "time" => attrs.time = Some(parse_time(&child)),
            "clef" => attrs.clefs.push(parse_clef(&child)),
            _ => {}
        }
    }

    attrs
}

fn merge_attributes(into: &mut Attributes, from: Attributes) {
    into.key = into.key.take().or(from.key);
    into.time = into.time.take().or(from.time);
    if into.clefs.is_empty() {
        into.clefs = from.clefs;
    }
}

fn parse_key(node: &Node) -> Key {
    let mut key = Key {
        fifths: 0,
        mode: None,
    };
    for child in node.children().filter(|n| n.is_element()) {
        match child.tag_name().name() {
            "fifths" => key.fifths = parse_i32(&child).unwrap_or(0),
            "mode" => key.mode = text_of(&child),
            _ => {}
        }
    }
    key
}

fn parse_time(node: &Node) -> TimeSignature {
    let mut ts = TimeSignature {
        beats: 4,
        beat_type: 4,
        senza_misura: false,
    };
    for child in node.children().filter(|n| n.is_element()) {
        match child.tag_name().name() {
            "beats" => ts.beats = parse_i32(&child).unwrap_or(4),
            "beat-type" => ts.beat_type = parse_i32(&child).unwrap_or(4),
            "senza-misura" => ts.senza_misura = true,
            _ => {}
        }
    }
    ts
}

fn parse_clef(node: &Node) -> Clef {
    let number = node
        .attribute("number")
        .and_then(|n| n.parse::<i32>().ok())
        .unwrap_or(1);
    let mut clef = Clef {
        number,
        sign: "G".to_string(),
        line: 2,
        octave_change: None,
    };
    for child in node.children().filter(|n| n.is_element()) {
        match child.tag_name().name() {
            "sign" => {
                clef.sign = child.text().unwrap_or("G").trim().to_string();
            }
            "line" => clef.line = parse_i32(&child).unwrap_or(2),
            "clef-octave-change" => clef.octave_change = parse_i32(&child),
            _ => {}
        }
    }
    clef
}

// ─── Note ────────────────────────────────────────────────────────────

fn parse_note(node: &Node) -> Note {
    let mut note = Note {
        default_x: node
            .attribute("default-x")
            .and_then(|v| v.parse().ok()),
        ..Default::default()
    };

    for child in node.children().filter(|n| n.is_element()) {
        match child.tag_name().name() {
            "pitch" => note.pitch = Some(parse_pitch(&child)),
            "staff" => note.staff = parse_i32(&child),
            "type" => note.note_type = text_of(&child),
            "stem" => note.stem = text_of(&child),
            "rest" => note.rest = true,
            _ => {}
        }
    }

    note
}

fn parse_pitch(node: &Node) -> Pitch {
    let mut pitch = Pitch {
        step: "C".to_string(),
        octave: 4,
        alter: None,
    };
    for child in node.children().filter(|n| n.is_element()) {
        match child.tag_name().name() {
            "step" => {
                pitch.step = child.text().unwrap_or("C").trim().to_string();
            }
            "octave" => pitch.octave = parse_i32(&child).unwrap_or(4),
            "alter" => pitch.alter = parse_f64(&child),
            _ => {}
        }
    }
    pitch
}

// ─── Helpers ─────────────────────────────────────────────────────────

fn text_of(node: &Node) -> Option<String> {
    node.text()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

fn parse_i32(node: &Node) -> Option<i32> {
    node.text()?.trim().parse().ok()
}

fn parse_f64(node: &Node) -> Option<f64> {
    node.text()?.trim().parse().ok()
}
