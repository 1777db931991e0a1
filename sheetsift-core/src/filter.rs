//! Row selection on the filter column

use crate::config::MarkerConfig;
use crate::header::Header;
use crate::reader::Worksheet;

/// A data row that passed the filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilteredRow {
    /// 1-based row number in the source sheet
    pub original_row: u32,
    /// 0-based position among the kept rows
    pub new_index: usize,
    /// Trimmed cell text, one entry per header column
    pub values: Vec<String>,
}

/// Inclusion rule for a single filter cell.
///
/// A row is kept when the cell mentions the filter value or the "all" marker,
/// unless it mentions the "except" marker together with the filter value.
/// An empty filter value is contained in every cell, so it keeps every row
/// that is not excepted.
pub fn is_row_included(cell: &str, filter_value: &str, markers: &MarkerConfig) -> bool {
    let mentions_value = cell.contains(filter_value);
    let include = mentions_value || cell.contains(markers.all.as_str());

    include && !(cell.contains(markers.except.as_str()) && mentions_value)
}

/// Select the data rows (2..=row_count) whose filter cell satisfies
/// [`is_row_included`], in ascending row order.
pub fn filter_rows(
    sheet: &Worksheet,
    header: &Header,
    column_index: u32,
    filter_value: &str,
    markers: &MarkerConfig,
) -> Vec<FilteredRow> {
    let mut rows = Vec::new();

    for row in 2..=sheet.row_count {
        let cell = sheet.cell_text(row, column_index).trim();
        if !is_row_included(cell, filter_value, markers) {
            continue;
        }

        let values = (1..=header.len() as u32)
            .map(|col| sheet.cell_text(row, col).trim().to_string())
            .collect();

        rows.push(FilteredRow {
            original_row: row,
            new_index: rows.len(),
            values,
        });
    }

    tracing::debug!(
        "Kept {} of {} data rows",
        rows.len(),
        sheet.row_count.saturating_sub(1)
    );

    rows
}
