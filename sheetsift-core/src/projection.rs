//! JSON view of the filtered rows

use crate::error::Result;
use crate::filter::FilteredRow;
use crate::header::Header;
use crate::images::RowImageBundle;
use base64::{Engine as _, engine::general_purpose};
use serde::Serialize;
use serde_json::{Map, Value};

/// Key under which a row's images are listed
pub const IMAGES_KEY: &str = "_images";

/// One JSON object per filtered row, in filtered order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Projection(Vec<Map<String, Value>>);

impl Projection {
    pub fn records(&self) -> &[Map<String, Value>] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Compact JSON text of the projection
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.0)?)
    }
}

/// Build the row records.
///
/// Keys follow header order. When a header name repeats, the key keeps the
/// position of its first occurrence and the value of its last. `_images` is
/// present only on rows that carry at least one image, with base64 payloads
/// in bundle order.
pub fn build_projection(
    header: &Header,
    rows: &[FilteredRow],
    bundles: &[RowImageBundle],
) -> Projection {
    let mut images_by_row: Vec<Vec<Value>> = vec![Vec::new(); rows.len()];
    for bundle in bundles {
        if let Some(images) = images_by_row.get_mut(bundle.new_index) {
            images.push(Value::String(general_purpose::STANDARD.encode(&bundle.bytes)));
        }
    }

    let records = rows
        .iter()
        .zip(images_by_row)
        .map(|(row, images)| {
            let mut record = Map::new();
            for (name, value) in header.names().iter().zip(&row.values) {
                record.insert(name.clone(), Value::String(value.clone()));
            }
            if !images.is_empty() {
                record.insert(IMAGES_KEY.to_string(), Value::Array(images));
            }
            record
        })
        .collect();

    Projection(records)
}
