use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::merger::TableRegion;

/// A positioned piece of page text, supplied by the page reader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRun {
    pub text: String,
    pub origin_x: f64,
    pub origin_y: f64,
}

impl TextRun {
    pub fn new(text: impl Into<String>, origin_x: f64, origin_y: f64) -> Self {
        Self {
            text: text.into(),
            origin_x,
            origin_y,
        }
    }
}

/// Cell text keyed by (row, col).
pub type CellMap = BTreeMap<(usize, usize), String>;

/// Assign every text run inside the region's box to a cell.
///
/// The box is divided into `row_count` x `col_count` equal bands, so the
/// divisor is the number of rulings, not the number of spaces between them.
/// Runs exactly on the bottom or right edge land in the last row/column.
pub fn bin_text_runs(region: &TableRegion, runs: &[TextRun]) -> CellMap {
    let bbox = &region.bounding_box;
    let row_height = bbox.height() / region.row_count as f64;
    let col_width = bbox.width() / region.col_count as f64;

    let mut cells = CellMap::new();
    let mut binned = 0usize;

    for run in runs {
        if !bbox.contains_point(run.origin_x, run.origin_y) {
            continue;
        }

        let row = band_index(run.origin_y - bbox.top, row_height, region.row_count);
        let col = band_index(run.origin_x - bbox.left, col_width, region.col_count);

        let buffer = cells.entry((row, col)).or_default();
        if !buffer.is_empty() {
            buffer.push(' ');
        }
        buffer.push_str(&run.text);
        binned += 1;
    }

    for text in cells.values_mut() {
        let trimmed = text.trim();
        if trimmed.len() != text.len() {
            *text = trimmed.to_string();
        }
    }

    debug!(runs = runs.len(), binned, cells = cells.len(), "binned text runs into cells");
    cells
}

fn band_index(offset: f64, band: f64, count: usize) -> usize {
    if band <= 0.0 {
        return 0;
    }
    ((offset / band).floor() as usize).min(count - 1)
}
