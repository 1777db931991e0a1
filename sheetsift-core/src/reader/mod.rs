//! XLSX reader using calamine for cell values and quick-xml for drawings

use crate::error::{AnchorError, Result, ValidationError};
use calamine::{Data, Range, Reader, Xlsx};
use std::collections::HashMap;
use std::io::{Cursor, Read, Seek};
use zip::ZipArchive;

pub mod workbook;
pub mod xml_parser;

pub use workbook::{ImageAnchor, Worksheet, cell_text};

/// Decode the first worksheet of an uploaded workbook.
///
/// Fails with [`ValidationError::NoFile`] on an empty upload and with
/// [`ValidationError::EmptyWorksheet`] when the sheet has no used range.
pub fn read_worksheet(bytes: &[u8]) -> Result<Worksheet> {
    if bytes.is_empty() {
        return Err(ValidationError::NoFile.into());
    }

    let mut excel: Xlsx<_> = Xlsx::new(Cursor::new(bytes))?;

    let name = excel.sheet_names().first().cloned().unwrap_or_default();
    let range = match excel.worksheet_range_at(0) {
        Some(range) => range?,
        None => return Err(ValidationError::EmptyWorksheet.into()),
    };

    let mut sheet = parse_sheet(&name, &range);
    if sheet.is_empty() {
        return Err(ValidationError::EmptyWorksheet.into());
    }

    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    sheet.image_anchors = read_image_anchors(&mut archive)?;

    tracing::debug!(
        "Read sheet '{}': {} rows, {} columns, {} images",
        sheet.name,
        sheet.row_count,
        sheet.column_count,
        sheet.image_anchors.len()
    );

    Ok(sheet)
}

/// Collect the pictures anchored to cells of the first worksheet.
///
/// Each anchor is resolved on its own; one that cannot be read is logged and
/// skipped without failing the others.
pub fn read_image_anchors(
    archive: &mut ZipArchive<impl Read + Seek>,
) -> Result<Vec<ImageAnchor>> {
    let Some(sheet_path) = xml_parser::first_sheet_path(archive)? else {
        return Ok(Vec::new());
    };
    let Some(drawing_path) = xml_parser::drawing_path(archive, &sheet_path)? else {
        return Ok(Vec::new());
    };

    let image_rels = xml_parser::image_relationships(archive, &drawing_path)?;
    let pictures = xml_parser::parse_picture_anchors(archive, &drawing_path)?;

    let mut anchors = Vec::with_capacity(pictures.len());
    for picture in pictures {
        match resolve_anchor(archive, &image_rels, &picture) {
            Ok(anchor) => anchors.push(anchor),
            Err(e) => tracing::warn!(
                "Skipping image anchored at row {}, column {}: {}",
                picture.row + 1,
                picture.col + 1,
                e
            ),
        }
    }

    Ok(anchors)
}

fn resolve_anchor(
    archive: &mut ZipArchive<impl Read + Seek>,
    image_rels: &HashMap<String, String>,
    picture: &xml_parser::PictureAnchor,
) -> std::result::Result<ImageAnchor, AnchorError> {
    let embed = picture.embed.as_ref().ok_or(AnchorError::MissingEmbed)?;
    let image_path = image_rels
        .get(embed)
        .ok_or_else(|| AnchorError::UnresolvedRelationship(embed.clone()))?;
    let bytes = xml_parser::read_image_part(archive, image_path)?;

    Ok(ImageAnchor {
        source_row: picture.row + 1,
        source_column: picture.col + 1,
        bytes,
    })
}

fn parse_sheet(name: &str, range: &Range<Data>) -> Worksheet {
    let mut cells = HashMap::new();

    // Positions are absolute so that row 1 stays the header row even when the
    // used range does not start at A1.
    let Some((end_row, end_col)) = range.end() else {
        return Worksheet {
            name: name.to_string(),
            ..Default::default()
        };
    };

    let (start_row, start_col) = range.start().unwrap_or((0, 0));

    for (row, col, data) in range.used_cells() {
        let text = cell_text(data);
        if text.is_empty() {
            continue;
        }
        let abs_row = start_row + row as u32;
        let abs_col = start_col + col as u32;
        cells.insert((abs_row + 1, abs_col + 1), text);
    }

    Worksheet {
        name: name.to_string(),
        cells,
        row_count: end_row + 1,
        column_count: end_col + 1,
        image_anchors: Vec::new(),
    }
}
