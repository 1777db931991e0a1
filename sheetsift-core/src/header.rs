//! Header row resolution

use crate::error::ValidationError;
use crate::reader::Worksheet;
use std::collections::HashMap;

/// Column names read from row 1, in column order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    names: Vec<String>,
}

impl Header {
    /// Read row 1 of the sheet, trimming every cell
    pub fn from_sheet(sheet: &Worksheet) -> Self {
        let names = (1..=sheet.column_count)
            .map(|col| sheet.cell_text(1, col).trim().to_string())
            .collect();
        Self { names }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Resolve a column name to its 1-based index.
    ///
    /// The requested name is trimmed; matching is exact and case-sensitive.
    /// With duplicate headers the first occurrence wins.
    pub fn resolve(&self, column_name: &str) -> Result<u32, ValidationError> {
        let column_name = column_name.trim();
        if column_name.is_empty() {
            return Err(ValidationError::ColumnNameRequired);
        }

        self.names
            .iter()
            .position(|name| name == column_name)
            .map(|idx| idx as u32 + 1)
            .ok_or_else(|| ValidationError::ColumnNotFound(column_name.to_string()))
    }

    /// For each column, the 0-based position of the last column with the same
    /// name. Rows are read through their header name, so repeated names all
    /// show the rightmost value.
    pub fn value_positions(&self) -> Vec<usize> {
        let mut last: HashMap<&str, usize> = HashMap::new();
        for (idx, name) in self.names.iter().enumerate() {
            last.insert(name.as_str(), idx);
        }

        self.names
            .iter()
            .enumerate()
            .map(|(idx, name)| last.get(name.as_str()).copied().unwrap_or(idx))
            .collect()
    }
}
