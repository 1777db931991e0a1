// ! Writer module for the filtered output workbook

mod xlsx_writer;

pub use xlsx_writer::{EncodedWorkbook, write_filtered_xlsx};

use crate::config::LayoutConfig;
use crate::error::Result;
use crate::filter::FilteredRow;
use crate::header::Header;
use crate::images::RowImageBundle;

/// Encode the filtered rows and their images as a new workbook
pub fn write_filtered_workbook(
    header: &Header,
    rows: &[FilteredRow],
    bundles: &[RowImageBundle],
    layout: &LayoutConfig,
) -> Result<EncodedWorkbook> {
    write_filtered_xlsx(header, rows, bundles, layout)
}
