//! Carry anchored images from the source rows to their filtered positions

use crate::filter::FilteredRow;
use crate::reader::ImageAnchor;
use std::collections::HashMap;

/// An image that follows its row into the filtered output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowImageBundle {
    /// Position of the owning row among the kept rows
    pub new_index: usize,
    /// Original 1-based column of the anchor; not remapped
    pub source_column: u32,
    pub bytes: Vec<u8>,
}

/// Re-key image anchors from source row numbers to filtered row positions.
///
/// Bundles come out in filtered row order, and within a row in the order the
/// anchors were encountered. Anchors on rows that were not kept are dropped.
pub fn associate_images(anchors: Vec<ImageAnchor>, rows: &[FilteredRow]) -> Vec<RowImageBundle> {
    let total = anchors.len();

    let mut by_row: HashMap<u32, Vec<(u32, Vec<u8>)>> = HashMap::new();
    for anchor in anchors {
        if anchor.bytes.is_empty() {
            tracing::warn!(
                "Dropping image with empty payload at row {}, column {}",
                anchor.source_row,
                anchor.source_column
            );
            continue;
        }
        by_row
            .entry(anchor.source_row)
            .or_default()
            .push((anchor.source_column, anchor.bytes));
    }

    let mut bundles = Vec::new();
    for row in rows {
        let Some(images) = by_row.remove(&row.original_row) else {
            continue;
        };
        bundles.extend(
            images
                .into_iter()
                .map(|(source_column, bytes)| RowImageBundle {
                    new_index: row.new_index,
                    source_column,
                    bytes,
                }),
        );
    }

    tracing::debug!("Carried {} of {} images forward", bundles.len(), total);

    bundles
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(original_row: u32, new_index: usize) -> FilteredRow {
        FilteredRow {
            original_row,
            new_index,
            values: vec![String::new()],
        }
    }

    fn anchor(source_row: u32, source_column: u32, tag: u8) -> ImageAnchor {
        ImageAnchor {
            source_row,
            source_column,
            bytes: vec![tag],
        }
    }

    #[test]
    fn test_only_kept_rows_carry_images() {
        let rows = vec![row(3, 0), row(5, 1)];
        let anchors = vec![anchor(5, 2, 1), anchor(6, 2, 2), anchor(4, 1, 3)];

        let bundles = associate_images(anchors, &rows);
        assert_eq!(
            bundles,
            vec![RowImageBundle {
                new_index: 1,
                source_column: 2,
                bytes: vec![1],
            }]
        );
    }

    #[test]
    fn test_bundle_order_follows_rows_then_encounter_order() {
        let rows = vec![row(2, 0), row(4, 1)];
        let anchors = vec![
            anchor(4, 3, 1),
            anchor(2, 1, 2),
            anchor(4, 1, 3),
            anchor(2, 5, 4),
        ];

        let bundles = associate_images(anchors, &rows);
        let summary: Vec<_> = bundles
            .iter()
            .map(|b| (b.new_index, b.source_column, b.bytes[0]))
            .collect();
        assert_eq!(summary, vec![(0, 1, 2), (0, 5, 4), (1, 3, 1), (1, 1, 3)]);
    }

    #[test]
    fn test_empty_payload_is_dropped() {
        let rows = vec![row(2, 0)];
        let anchors = vec![
            ImageAnchor {
                source_row: 2,
                source_column: 1,
                bytes: Vec::new(),
            },
            anchor(2, 2, 9),
        ];

        let bundles = associate_images(anchors, &rows);
        assert_eq!(bundles.len(), 1);
        assert_eq!(bundles[0].source_column, 2);
    }

    #[test]
    fn test_every_bundle_points_at_a_row() {
        let rows = vec![row(2, 0), row(7, 1), row(9, 2)];
        let anchors = (1..12).map(|r| anchor(r, 1, r as u8)).collect();

        let bundles = associate_images(anchors, &rows);
        assert_eq!(bundles.len(), 3);
        assert!(bundles.iter().all(|b| b.new_index < rows.len()));
    }
}
