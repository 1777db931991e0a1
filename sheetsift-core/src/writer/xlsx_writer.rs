// ! XLSX writer for the filtered workbook

use crate::config::LayoutConfig;
use crate::error::Result;
use crate::filter::FilteredRow;
use crate::header::Header;
use crate::images::RowImageBundle;
use rust_xlsxwriter::{Format, FormatAlign, Image, ObjectMovement, Workbook, Worksheet, XlsxError};

/// Bytes of a freshly built workbook
#[derive(Debug, Clone)]
pub struct EncodedWorkbook {
    pub bytes: Vec<u8>,
    /// Number of bundles that ended up as pictures in the sheet
    pub images_embedded: usize,
}

/// Build a single-sheet workbook holding the header, the kept rows and their
/// images.
///
/// Rows are written at `new_index + 2` (1-based). Images keep their original
/// column and are placed on their row with the configured offsets and size.
/// An image whose bytes cannot be embedded is skipped with a warning.
pub fn write_filtered_xlsx(
    header: &Header,
    rows: &[FilteredRow],
    bundles: &[RowImageBundle],
    layout: &LayoutConfig,
) -> Result<EncodedWorkbook> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(&layout.sheet_name)?;
    worksheet.set_default_row_height(layout.row_height);

    let header_format = Format::new()
        .set_bold()
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter);
    let cell_format = Format::new()
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
        .set_text_wrap();

    // Cover image columns that lie past the last header column too
    let widest = bundles
        .iter()
        .map(|b| b.source_column as usize)
        .chain(std::iter::once(header.len()))
        .max()
        .unwrap_or(0);
    for col in 0..widest.min(MAX_COLUMNS) {
        worksheet.set_column_width(col as u16, layout.column_width)?;
    }

    for (col, name) in header.names().iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, name, &header_format)?;
    }

    // Same name-keyed lookup as the JSON projection
    let positions = header.value_positions();
    for row in rows {
        let excel_row = row.new_index as u32 + 1;
        for (col, &pos) in positions.iter().enumerate() {
            let value = row.values.get(pos).map(String::as_str).unwrap_or("");
            worksheet.write_string_with_format(excel_row, col as u16, value, &cell_format)?;
        }
    }

    let mut images_embedded = 0;
    for bundle in bundles {
        match insert_bundle(worksheet, bundle, layout) {
            Ok(()) => images_embedded += 1,
            Err(e) => tracing::warn!(
                "Skipping image for filtered row {} in column {}: {}",
                bundle.new_index,
                bundle.source_column,
                e
            ),
        }
    }

    let bytes = workbook.save_to_buffer()?;

    tracing::debug!(
        "Encoded {} rows and {} of {} images into {} bytes",
        rows.len(),
        images_embedded,
        bundles.len(),
        bytes.len()
    );

    Ok(EncodedWorkbook {
        bytes,
        images_embedded,
    })
}

/// Excel column limit (XFD)
const MAX_COLUMNS: usize = 16_384;

fn insert_bundle(
    worksheet: &mut Worksheet,
    bundle: &RowImageBundle,
    layout: &LayoutConfig,
) -> std::result::Result<(), XlsxError> {
    let col = bundle
        .source_column
        .checked_sub(1)
        .and_then(|c| u16::try_from(c).ok())
        .ok_or(XlsxError::RowColumnLimitError)?;
    let row = bundle.new_index as u32 + 1;

    let image = Image::new_from_buffer(&bundle.bytes)?
        .set_scale_to_size(
            f64::from(layout.image_width),
            f64::from(layout.image_height),
            false,
        )
        .set_object_movement(ObjectMovement::MoveButDontSizeWithCells);

    worksheet.insert_image_with_offset(
        row,
        col,
        &image,
        layout.image_col_offset,
        layout.image_row_offset,
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::{read_image_anchors, read_worksheet};
    use crate::reader::Worksheet as SourceSheet;
    use std::io::{Cursor, Read};
    use zip::ZipArchive;

    const PNG_1X1: &[u8] = &[
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
        0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
        0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0A, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00,
        0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49,
        0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
    ];

    fn header(names: &[&str]) -> Header {
        let mut sheet = SourceSheet {
            row_count: 1,
            column_count: names.len() as u32,
            ..Default::default()
        };
        for (idx, name) in names.iter().enumerate() {
            sheet.cells.insert((1, idx as u32 + 1), name.to_string());
        }
        Header::from_sheet(&sheet)
    }

    fn part_text(bytes: &[u8], name: &str) -> String {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut text = String::new();
        archive
            .by_name(name)
            .unwrap()
            .read_to_string(&mut text)
            .unwrap();
        text
    }

    fn row(original_row: u32, new_index: usize, values: &[&str]) -> FilteredRow {
        FilteredRow {
            original_row,
            new_index,
            values: values.iter().map(|v| v.to_string()).collect(),
        }
    }

    #[test]
    fn test_rows_are_written_below_header() {
        let header = header(&["Name", "Dept"]);
        let rows = vec![row(4, 0, &["A", "Sales"]), row(9, 1, &["B", ""])];

        let encoded =
            write_filtered_xlsx(&header, &rows, &[], &LayoutConfig::default()).unwrap();
        assert_eq!(encoded.images_embedded, 0);

        let sheet = read_worksheet(&encoded.bytes).unwrap();
        assert_eq!(sheet.name, "Filtered");
        assert_eq!(sheet.cell_text(1, 1), "Name");
        assert_eq!(sheet.cell_text(1, 2), "Dept");
        assert_eq!(sheet.cell_text(2, 1), "A");
        assert_eq!(sheet.cell_text(2, 2), "Sales");
        assert_eq!(sheet.cell_text(3, 1), "B");
    }

    #[test]
    fn test_images_land_on_their_new_row_and_original_column() {
        let header = header(&["Name", "Dept"]);
        let rows = vec![row(3, 0, &["A", "Sales"]), row(5, 1, &["B", "Sales"])];
        let bundles = vec![RowImageBundle {
            new_index: 1,
            source_column: 4,
            bytes: PNG_1X1.to_vec(),
        }];

        let encoded =
            write_filtered_xlsx(&header, &rows, &bundles, &LayoutConfig::default()).unwrap();
        assert_eq!(encoded.images_embedded, 1);

        let mut archive = ZipArchive::new(Cursor::new(encoded.bytes.as_slice())).unwrap();
        let anchors = read_image_anchors(&mut archive).unwrap();
        assert_eq!(anchors.len(), 1);
        assert_eq!(anchors[0].source_row, 3);
        assert_eq!(anchors[0].source_column, 4);
        assert_eq!(anchors[0].bytes, PNG_1X1);
    }

    #[test]
    fn test_unreadable_image_is_skipped() {
        let header = header(&["Name"]);
        let rows = vec![row(2, 0, &["A"])];
        let bundles = vec![
            RowImageBundle {
                new_index: 0,
                source_column: 1,
                bytes: b"not an image".to_vec(),
            },
            RowImageBundle {
                new_index: 0,
                source_column: 2,
                bytes: PNG_1X1.to_vec(),
            },
        ];

        let encoded =
            write_filtered_xlsx(&header, &rows, &bundles, &LayoutConfig::default()).unwrap();
        assert_eq!(encoded.images_embedded, 1);
    }

    #[test]
    fn test_custom_sheet_name() {
        let layout = LayoutConfig {
            sheet_name: "Sales only".to_string(),
            ..Default::default()
        };
        let encoded = write_filtered_xlsx(&header(&["Name"]), &[], &[], &layout).unwrap();

        let sheet = read_worksheet(&encoded.bytes).unwrap();
        assert_eq!(sheet.name, "Sales only");
        assert_eq!(sheet.row_count, 1);
    }

    #[test]
    fn test_duplicate_headers_show_last_value_in_every_column() {
        let header = header(&["Dept", "Name", "Dept"]);
        let rows = vec![row(2, 0, &["first", "A", "last"])];

        let encoded =
            write_filtered_xlsx(&header, &rows, &[], &LayoutConfig::default()).unwrap();

        let sheet = read_worksheet(&encoded.bytes).unwrap();
        assert_eq!(sheet.cell_text(1, 1), "Dept");
        assert_eq!(sheet.cell_text(1, 3), "Dept");
        assert_eq!(sheet.cell_text(2, 1), "last");
        assert_eq!(sheet.cell_text(2, 2), "A");
        assert_eq!(sheet.cell_text(2, 3), "last");
    }

    #[test]
    fn test_layout_of_sheet_styles_and_drawing() {
        let header = header(&["Name", "Dept"]);
        let rows = vec![row(2, 0, &["A", "Sales"])];
        let bundles = vec![RowImageBundle {
            new_index: 0,
            source_column: 2,
            bytes: PNG_1X1.to_vec(),
        }];

        let encoded =
            write_filtered_xlsx(&header, &rows, &bundles, &LayoutConfig::default()).unwrap();

        // 5px offsets and 100px sides in EMU (9525 per pixel)
        let drawing = part_text(&encoded.bytes, "xl/drawings/drawing1.xml");
        assert!(drawing.contains(r#"editAs="oneCell""#));
        assert!(drawing.contains("<xdr:colOff>47625</xdr:colOff>"));
        assert!(drawing.contains("<xdr:rowOff>47625</xdr:rowOff>"));
        assert!(drawing.contains(r#"cx="952500""#));
        assert!(drawing.contains(r#"cy="952500""#));

        let worksheet = part_text(&encoded.bytes, "xl/worksheets/sheet1.xml");
        assert!(worksheet.contains(r#"defaultRowHeight="80""#));
        // Character width 15 as stored by the writer
        assert!(worksheet.contains(r#"width="15.7109375""#));

        let styles = part_text(&encoded.bytes, "xl/styles.xml");
        assert!(styles.contains("<b/>"));
        assert!(styles.contains(r#"horizontal="center""#));
        assert!(styles.contains(r#"vertical="center""#));
        assert!(styles.contains(r#"wrapText="1""#));
    }
}
