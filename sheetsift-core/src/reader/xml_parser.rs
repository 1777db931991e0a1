//! XML parsing utilities for locating the pictures of an XLSX worksheet
//!
//! Pictures live outside the sheet XML. The chain is:
//! `xl/workbook.xml` (first `sheet`, `r:id`) -> `xl/_rels/workbook.xml.rels`
//! -> `xl/worksheets/_rels/sheetN.xml.rels` (drawing) -> `xl/drawings/drawingN.xml`
//! (anchors + `r:embed`) -> `xl/drawings/_rels/drawingN.xml.rels` -> `xl/media/*`.

use crate::error::{AnchorError, Result, SiftError};
use quick_xml::Reader;
use quick_xml::events::Event;
use std::collections::HashMap;
use std::io::{BufReader, Read, Seek};
use zip::ZipArchive;

/// Cell anchor of a picture as found in the drawing part (0-based)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PictureAnchor {
    pub row: u32,
    pub col: u32,
    /// Relationship id of the embedded image (`r:embed`)
    pub embed: Option<String>,
}

/// Resolve the archive path of the first worksheet in workbook order
pub fn first_sheet_path(
    archive: &mut ZipArchive<impl Read + Seek>,
) -> Result<Option<String>> {
    const WORKBOOK_PART: &str = "xl/workbook.xml";

    let first_sheet_rid = {
        let workbook_xml = match archive.by_name(WORKBOOK_PART) {
            Ok(file) => file,
            Err(_) => return Ok(None),
        };

        let mut reader = Reader::from_reader(BufReader::new(workbook_xml));
        reader.config_mut().trim_text(true);

        let mut buf = Vec::new();
        let mut rid = None;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                    if e.local_name().as_ref() == b"sheet" {
                        rid = e
                            .attributes()
                            .flatten()
                            .find(|attr| attr.key.local_name().as_ref() == b"id")
                            .map(|attr| String::from_utf8_lossy(&attr.value).to_string());
                        break;
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(xml_error(WORKBOOK_PART, e)),
                _ => {}
            }
            buf.clear();
        }
        rid
    };

    let Some(rid) = first_sheet_rid else {
        return Ok(None);
    };

    let rels = read_relationships(archive, "xl/_rels/workbook.xml.rels", "xl")?;
    Ok(rels.get(&rid).map(|rel| rel.target.clone()))
}

/// Get the drawing part referenced by a worksheet, if any
pub fn drawing_path(
    archive: &mut ZipArchive<impl Read + Seek>,
    sheet_path: &str,
) -> Result<Option<String>> {
    let rels_path = construct_rels_path(sheet_path);
    let rels = read_relationships(archive, &rels_path, parent_dir(sheet_path))?;

    Ok(rels
        .into_values()
        .find(|rel| rel.rel_type.ends_with("/drawing"))
        .map(|rel| rel.target))
}

/// Map relationship ids of a drawing part to the image parts they point at
pub fn image_relationships(
    archive: &mut ZipArchive<impl Read + Seek>,
    drawing_path: &str,
) -> Result<HashMap<String, String>> {
    let rels_path = construct_rels_path(drawing_path);
    let rels = read_relationships(archive, &rels_path, parent_dir(drawing_path))?;

    Ok(rels
        .into_iter()
        .filter(|(_, rel)| rel.rel_type.ends_with("/image"))
        .map(|(id, rel)| (id, rel.target))
        .collect())
}

/// Extract the cell-anchored pictures of a drawing part, in document order.
///
/// Absolute anchors, charts, shapes and grouped pictures carry no single
/// source cell and are left out.
pub fn parse_picture_anchors(
    archive: &mut ZipArchive<impl Read + Seek>,
    drawing_path: &str,
) -> Result<Vec<PictureAnchor>> {
    let mut anchors = Vec::new();

    let drawing_xml = match archive.by_name(drawing_path) {
        Ok(file) => file,
        Err(_) => return Ok(anchors),
    };

    let mut reader = Reader::from_reader(BufReader::new(drawing_xml));
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut current: Option<AnchorBuilder> = None;
    let mut in_from = false;
    let mut field: Option<FromField> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"twoCellAnchor" | b"oneCellAnchor" => current = Some(AnchorBuilder::default()),
                b"from" if current.is_some() => in_from = true,
                b"row" if in_from => field = Some(FromField::Row),
                b"col" if in_from => field = Some(FromField::Col),
                b"pic" => {
                    if let Some(builder) = current.as_mut() {
                        builder.is_picture = true;
                    }
                }
                b"grpSp" => {
                    if let Some(builder) = current.as_mut() {
                        builder.is_group = true;
                    }
                }
                b"blip" => {
                    if let Some(builder) = current.as_mut() {
                        builder.embed = embed_attribute(&e);
                    }
                }
                _ => {}
            },
            Ok(Event::Empty(e)) => {
                if e.local_name().as_ref() == b"blip" {
                    if let Some(builder) = current.as_mut() {
                        builder.embed = embed_attribute(&e);
                    }
                }
            }
            Ok(Event::Text(e)) => {
                if let (Some(which), Some(builder)) = (field, current.as_mut()) {
                    let value = e
                        .unescape()
                        .ok()
                        .and_then(|text| text.trim().parse::<u32>().ok());
                    match which {
                        FromField::Row => builder.row = value,
                        FromField::Col => builder.col = value,
                    }
                }
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"from" => in_from = false,
                b"row" | b"col" => field = None,
                b"twoCellAnchor" | b"oneCellAnchor" => {
                    if let Some(builder) = current.take() {
                        match builder.finish() {
                            Some(anchor) => anchors.push(anchor),
                            None => tracing::debug!(
                                "Skipping non-picture anchor in {}",
                                drawing_path
                            ),
                        }
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_error(drawing_path, e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(anchors)
}

/// Read the raw bytes of an image part
pub fn read_image_part(
    archive: &mut ZipArchive<impl Read + Seek>,
    image_path: &str,
) -> std::result::Result<Vec<u8>, AnchorError> {
    let mut file = archive
        .by_name(image_path)
        .map_err(|e| AnchorError::UnreadablePart {
            path: image_path.to_string(),
            reason: e.to_string(),
        })?;

    let mut data = Vec::new();
    file.read_to_end(&mut data)
        .map_err(|e| AnchorError::UnreadablePart {
            path: image_path.to_string(),
            reason: e.to_string(),
        })?;

    if data.is_empty() {
        return Err(AnchorError::EmptyPayload(image_path.to_string()));
    }

    Ok(data)
}

#[derive(Debug, Clone, Copy)]
enum FromField {
    Row,
    Col,
}

#[derive(Debug, Default)]
struct AnchorBuilder {
    row: Option<u32>,
    col: Option<u32>,
    embed: Option<String>,
    is_picture: bool,
    is_group: bool,
}

impl AnchorBuilder {
    fn finish(self) -> Option<PictureAnchor> {
        if !self.is_picture || self.is_group {
            return None;
        }
        Some(PictureAnchor {
            row: self.row?,
            col: self.col?,
            embed: self.embed,
        })
    }
}

#[derive(Debug, Clone)]
struct Relationship {
    target: String,
    rel_type: String,
}

/// Parse a `.rels` part into id -> relationship, resolving targets against `base_dir`
fn read_relationships(
    archive: &mut ZipArchive<impl Read + Seek>,
    rels_path: &str,
    base_dir: &str,
) -> Result<HashMap<String, Relationship>> {
    let mut rels = HashMap::new();

    let rels_xml = match archive.by_name(rels_path) {
        Ok(file) => file,
        Err(_) => return Ok(rels),
    };

    let mut reader = Reader::from_reader(BufReader::new(rels_xml));
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                if e.local_name().as_ref() == b"Relationship" {
                    let mut id = String::new();
                    let mut target = String::new();
                    let mut rel_type = String::new();
                    let mut external = false;

                    for attr in e.attributes().flatten() {
                        let value = attr.unescape_value().unwrap_or_default().to_string();
                        match attr.key.as_ref() {
                            b"Id" => id = value,
                            b"Target" => target = value,
                            b"Type" => rel_type = value,
                            b"TargetMode" => external = value == "External",
                            _ => {}
                        }
                    }

                    if !id.is_empty() && !target.is_empty() && !external {
                        rels.insert(
                            id,
                            Relationship {
                                target: resolve_relative_path(base_dir, &target),
                                rel_type,
                            },
                        );
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_error(rels_path, e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(rels)
}

fn embed_attribute(e: &quick_xml::events::BytesStart<'_>) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.local_name().as_ref() == b"embed")
        .map(|attr| String::from_utf8_lossy(&attr.value).to_string())
}

fn xml_error(part: &str, source: quick_xml::Error) -> SiftError {
    SiftError::Xml {
        part: part.to_string(),
        source,
    }
}

fn parent_dir(path: &str) -> &str {
    path.rfind('/').map(|pos| &path[..pos]).unwrap_or("")
}

/// "xl/drawings/drawing1.xml" -> "xl/drawings/_rels/drawing1.xml.rels"
fn construct_rels_path(file_path: &str) -> String {
    match file_path.rfind('/') {
        Some(pos) => format!("{}/_rels/{}.rels", &file_path[..pos], &file_path[pos + 1..]),
        None => format!("_rels/{file_path}.rels"),
    }
}

/// Resolve "../media/image1.png" against "xl/drawings"
fn resolve_relative_path(base_dir: &str, relative: &str) -> String {
    if let Some(stripped) = relative.strip_prefix('/') {
        return stripped.to_string();
    }

    let mut components: Vec<&str> = base_dir.split('/').filter(|s| !s.is_empty()).collect();
    for part in relative.split('/') {
        match part {
            ".." => {
                components.pop();
            }
            "." | "" => {}
            _ => components.push(part),
        }
    }

    components.join("/")
}
