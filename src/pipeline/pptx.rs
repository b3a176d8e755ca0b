//! Slide-deck text extraction: `.pptx` is a ZIP of OOXML parts.
//!
//! Slides are visited in presentation order (the `sldIdLst` in
//! `ppt/presentation.xml`, resolved through its relationships part), not in
//! ZIP entry order, which is arbitrary. Within a slide, the top-level shapes of
//! `p:spTree` are visited in document order. Only `p:sp` shapes carry a text
//! frame; pictures, connectors, graphic frames and groups are skipped.
//!
//! Each text-bearing shape contributes its paragraphs joined by `\n`, followed
//! by a trailing `\n`. A shape with an empty text frame still contributes the
//! newline. A soft line break (`a:br`) is also emitted as `\n`, not as a
//! vertical tab.

use crate::error::ExtractionError;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use tracing::{debug, warn};
use zip::ZipArchive;

const PRESENTATION_PART: &str = "ppt/presentation.xml";
const PRESENTATION_RELS_PART: &str = "ppt/_rels/presentation.xml.rels";

/// Extract the text of every shape on every slide of the deck at `path`.
pub fn extract_pptx_text(path: &Path) -> Result<String, ExtractionError> {
    let file = File::open(path).map_err(|source| ExtractionError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    read_deck(BufReader::new(file)).map_err(|detail| {
        warn!("Unreadable PPTX {}: {}", path.display(), detail);
        ExtractionError::UnreadablePptx {
            path: path.to_path_buf(),
            detail,
        }
    })
}

fn read_deck<R: Read + Seek>(reader: R) -> Result<String, String> {
    let mut archive = ZipArchive::new(reader).map_err(|e| format!("Not a valid presentation: {e}"))?;

    let slides = slide_parts(&mut archive)?;
    debug!("Deck has {} slides", slides.len());

    let mut text = String::new();
    for part in &slides {
        let xml = read_part(&mut archive, part)?;
        for shape_text in shape_texts(&xml).map_err(|e| format!("{part}: {e}"))? {
            text.push_str(&shape_text);
            text.push('\n');
        }
    }
    Ok(text)
}

fn read_part<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Result<String, String> {
    let mut entry = archive
        .by_name(name)
        .map_err(|e| format!("Missing part '{name}': {e}"))?;
    let mut xml = String::new();
    entry
        .read_to_string(&mut xml)
        .map_err(|e| format!("Failed to read part '{name}': {e}"))?;
    Ok(xml)
}

/// Slide part names (e.g. `ppt/slides/slide1.xml`) in presentation order.
fn slide_parts<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Result<Vec<String>, String> {
    let presentation = read_part(archive, PRESENTATION_PART)?;
    let rels = read_part(archive, PRESENTATION_RELS_PART)?;

    let targets = relationship_targets(&rels)?;
    let ids = slide_rel_ids(&presentation)?;

    ids.into_iter()
        .map(|id| {
            targets
                .get(&id)
                .map(|target| resolve_target(target))
                .ok_or_else(|| format!("Slide relationship '{id}' not found"))
        })
        .collect()
}

/// `Id → Target` for every `Relationship` in a `.rels` part.
fn relationship_targets(xml: &str) -> Result<HashMap<String, String>, String> {
    let mut reader = Reader::from_str(xml);
    let mut targets = HashMap::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e))
                if e.local_name().as_ref() == b"Relationship" =>
            {
                let mut id = None;
                let mut target = None;
                for attr in e.attributes().flatten() {
                    let value = attr
                        .unescape_value()
                        .map_err(|err| format!("Bad relationship attribute: {err}"))?
                        .into_owned();
                    match attr.key.as_ref() {
                        b"Id" => id = Some(value),
                        b"Target" => target = Some(value),
                        _ => {}
                    }
                }
                if let (Some(id), Some(target)) = (id, target) {
                    targets.insert(id, target);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(format!(
                    "Malformed relationships at byte {}: {e}",
                    reader.buffer_position()
                ))
            }
            _ => {}
        }
    }
    Ok(targets)
}

/// Relationship ids of `p:sldId` entries, in list order.
fn slide_rel_ids(xml: &str) -> Result<Vec<String>, String> {
    let mut reader = Reader::from_str(xml);
    let mut ids = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) if e.local_name().as_ref() == b"sldId" => {
                // Both `id` and `r:id` share the local name; the relationship
                // id is the namespaced one.
                for attr in e.attributes().flatten() {
                    if attr.key.local_name().as_ref() == b"id" && attr.key.prefix().is_some() {
                        let value = attr
                            .unescape_value()
                            .map_err(|err| format!("Bad slide id attribute: {err}"))?;
                        ids.push(value.into_owned());
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(format!(
                    "Malformed presentation at byte {}: {e}",
                    reader.buffer_position()
                ))
            }
            _ => {}
        }
    }
    Ok(ids)
}

/// Resolve a relationship target relative to `ppt/`.
fn resolve_target(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("ppt/{}", target.trim_start_matches("./")),
    }
}

/// Text of every top-level `p:sp` shape in a slide, in document order.
fn shape_texts(xml: &str) -> Result<Vec<String>, String> {
    let mut reader = Reader::from_str(xml);

    let mut depth = 0usize;
    let mut tree_depth: Option<usize> = None;
    // Depth of the `p:sp` currently being read, if any.
    let mut shape_depth: Option<usize> = None;
    let mut in_text_body = false;
    let mut in_run_text = false;

    let mut shapes = Vec::new();
    let mut paragraphs: Vec<String> = Vec::new();
    let mut paragraph = String::new();

    loop {
        let event = reader.read_event().map_err(|e| {
            format!("Malformed slide XML at byte {}: {e}", reader.buffer_position())
        })?;

        match event {
            Event::Start(ref e) => {
                depth += 1;
                let name = e.local_name();
                match name.as_ref() {
                    b"spTree" if tree_depth.is_none() => tree_depth = Some(depth),
                    b"sp" if shape_depth.is_none() && is_top_level(tree_depth, depth) => {
                        shape_depth = Some(depth);
                        paragraphs.clear();
                    }
                    b"txBody" if shape_depth.is_some() => in_text_body = true,
                    b"p" if in_text_body => paragraph.clear(),
                    b"t" if in_text_body => in_run_text = true,
                    _ => {}
                }
            }
            Event::Empty(ref e) => {
                let name = e.local_name();
                match name.as_ref() {
                    b"sp" if shape_depth.is_none() && is_top_level(tree_depth, depth + 1) => {
                        shapes.push(String::new());
                    }
                    b"p" if in_text_body => paragraphs.push(String::new()),
                    b"br" if in_text_body => paragraph.push('\n'),
                    _ => {}
                }
            }
            Event::Text(ref t) if in_run_text => {
                let text = t.unescape().map_err(|e| format!("Bad text run: {e}"))?;
                paragraph.push_str(&text);
            }
            Event::CData(ref t) if in_run_text => {
                paragraph.push_str(&String::from_utf8_lossy(t));
            }
            Event::End(ref e) => {
                let name = e.local_name();
                match name.as_ref() {
                    b"t" => in_run_text = false,
                    b"p" if in_text_body => paragraphs.push(std::mem::take(&mut paragraph)),
                    b"txBody" => in_text_body = false,
                    b"sp" if shape_depth == Some(depth) => {
                        shapes.push(paragraphs.join("\n"));
                        paragraphs.clear();
                        shape_depth = None;
                    }
                    _ => {}
                }
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(shapes)
}

fn is_top_level(tree_depth: Option<usize>, depth: usize) -> bool {
    tree_depth.is_some_and(|t| depth == t + 1)
}
