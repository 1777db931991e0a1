//! sheetsift-core: filter spreadsheet rows and re-export them with their images
//!
//! The pipeline reads the first worksheet of an XLSX upload, keeps the rows whose
//! filter column matches, moves every anchored picture along with its row, and
//! returns both a new workbook and a JSON view of the kept rows.

pub mod config;
pub mod error;
pub mod filter;
pub mod header;
pub mod images;
pub mod projection;
pub mod reader;
pub mod result;
pub mod writer;

use serde::Serialize;

pub use config::{LayoutConfig, MarkerConfig, SifterConfig};
pub use error::{AnchorError, Result, SiftError, ValidationError};
pub use header::Header;
pub use projection::Projection;
pub use result::FilterResult;

/// Counts gathered while running one request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SiftSummary {
    /// Data rows below the header
    pub rows_scanned: usize,
    pub rows_kept: usize,
    /// Pictures resolved in the source sheet
    pub anchors_found: usize,
    /// Pictures attached to kept rows
    pub images_kept: usize,
    /// Pictures actually placed in the output workbook
    pub images_embedded: usize,
}

/// Result of [`Sifter::run`]
#[derive(Debug, Clone)]
pub struct SiftOutput {
    pub result: FilterResult,
    pub summary: SiftSummary,
}

/// Main filter interface
pub struct Sifter {
    config: SifterConfig,
}

impl Sifter {
    /// Create a new sifter with default configuration
    pub fn new() -> Self {
        Self::with_config(SifterConfig::default())
    }

    /// Create a new sifter with custom configuration.
    ///
    /// The configuration is taken as-is; use [`Sifter::try_with_config`] for
    /// values that come from outside, since an empty marker matches every cell.
    pub fn with_config(config: SifterConfig) -> Self {
        Self { config }
    }

    /// Create a new sifter after checking the configuration
    pub fn try_with_config(config: SifterConfig) -> anyhow::Result<Self> {
        config.validate()?;
        Ok(Self::with_config(config))
    }

    pub fn config(&self) -> &SifterConfig {
        &self.config
    }

    /// Filter an uploaded workbook and return only the response payload
    pub fn filter_bytes(
        &self,
        file: &[u8],
        column_name: &str,
        filter_value: &str,
    ) -> Result<FilterResult> {
        Ok(self.run(file, column_name, filter_value)?.result)
    }

    /// Filter an uploaded workbook.
    ///
    /// Validation failures (no file, empty sheet, missing or unknown column)
    /// abort before any output is built. `filter_value` is used as given; an
    /// empty value keeps every row that is not excepted.
    pub fn run(&self, file: &[u8], column_name: &str, filter_value: &str) -> Result<SiftOutput> {
        let mut sheet = reader::read_worksheet(file)?;
        let header = Header::from_sheet(&sheet);
        let column_index = header.resolve(column_name)?;

        let rows = filter::filter_rows(
            &sheet,
            &header,
            column_index,
            filter_value,
            &self.config.markers,
        );

        let anchors = std::mem::take(&mut sheet.image_anchors);
        let anchors_found = anchors.len();
        let bundles = images::associate_images(anchors, &rows);

        // Both stages only borrow the filtered rows and bundles
        let (projection, encoded) = rayon::join(
            || projection::build_projection(&header, &rows, &bundles),
            || writer::write_filtered_workbook(&header, &rows, &bundles, &self.config.layout),
        );
        let encoded = encoded?;

        let result = result::assemble(&encoded.bytes, &projection)?;

        let summary = SiftSummary {
            rows_scanned: sheet.row_count.saturating_sub(1) as usize,
            rows_kept: rows.len(),
            anchors_found,
            images_kept: bundles.len(),
            images_embedded: encoded.images_embedded,
        };

        tracing::debug!("Sift finished: {:?}", summary);

        Ok(SiftOutput { result, summary })
    }
}

impl Default for Sifter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_with_config_rejects_empty_marker() {
        let mut config = SifterConfig::default();
        config.markers.all = String::new();

        let err = Sifter::try_with_config(config).err().unwrap();
        assert!(err.to_string().contains("markers.all"));
    }

    #[test]
    fn test_try_with_config_keeps_valid_config() {
        let mut config = SifterConfig::default();
        config.layout.sheet_name = "Team".to_string();

        let sifter = Sifter::try_with_config(config.clone()).unwrap();
        assert_eq!(sifter.config(), &config);
    }
}
