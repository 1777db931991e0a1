//! Worksheet data structures

use calamine::Data;
use std::collections::HashMap;

/// Read-only view of the first worksheet of an upload.
///
/// Rows and columns are 1-based; row 1 is the header row. Every cell is
/// normalized to text when the sheet is read, see [`cell_text`].
#[derive(Debug, Clone, Default)]
pub struct Worksheet {
    pub name: String,
    /// Non-empty cells keyed by (row, col)
    pub cells: HashMap<(u32, u32), String>,
    /// Last used row
    pub row_count: u32,
    /// Last used column
    pub column_count: u32,
    /// Pictures anchored to cells, in drawing order
    pub image_anchors: Vec<ImageAnchor>,
}

impl Worksheet {
    /// Text of the cell at (row, col), empty when the cell is blank
    pub fn cell_text(&self, row: u32, col: u32) -> &str {
        self.cells.get(&(row, col)).map(String::as_str).unwrap_or("")
    }

    /// Whether the sheet has no used range at all
    pub fn is_empty(&self) -> bool {
        self.row_count == 0 || self.column_count == 0
    }
}

/// A picture anchored to a cell of the source sheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAnchor {
    pub source_row: u32,
    pub source_column: u32,
    pub bytes: Vec<u8>,
}

/// Normalize a decoded cell to its text form.
///
/// Empty cells become "", numbers use their shortest form (`1.0` -> "1"),
/// booleans are "True"/"False" and dates fall back to their serial number.
/// Numbers are always written positionally, never with an exponent
/// (`1e21` -> "1000000000000000000000").
pub fn cell_text(data: &Data) -> String {
    match data {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => f.to_string(),
        Data::Bool(true) => "True".to_string(),
        Data::Bool(false) => "False".to_string(),
        Data::Error(e) => e.to_string(),
        Data::DateTime(dt) => dt.as_f64().to_string(),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
    }
}
