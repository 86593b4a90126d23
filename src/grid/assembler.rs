use serde::{Deserialize, Serialize};

use crate::geometry::BoundingBox;
use super::binner::CellMap;
use super::merger::TableRegion;

/// A reconstructed table, ready for the document model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// `table_{page}_{index}`
    pub id: String,
    pub page_number: u32,
    pub bounding_box: BoundingBox,
    pub header_row: Vec<String>,
    pub data_rows: Vec<Vec<String>>,
}

impl Table {
    /// Number of rows including the header
    pub fn row_count(&self) -> usize {
        self.data_rows.len() + 1
    }

    pub fn column_count(&self) -> usize {
        self.header_row.len()
    }

    /// Header row followed by data rows
    pub fn rows(&self) -> impl Iterator<Item = &Vec<String>> {
        std::iter::once(&self.header_row).chain(self.data_rows.iter())
    }
}

/// Turn a region's cell map into a table: row 0 is the header, rows
/// `1..row_count` are data, every row has `col_count` entries.
pub fn assemble_table(page_number: u32, index: usize, region: &TableRegion, cells: &CellMap) -> Table {
    let row = |r: usize| -> Vec<String> {
        (0..region.col_count)
            .map(|c| cells.get(&(r, c)).cloned().unwrap_or_default())
            .collect()
    };

    Table {
        id: format!("table_{}_{}", page_number, index),
        page_number,
        bounding_box: region.bounding_box,
        header_row: row(0),
        data_rows: (1..region.row_count).map(row).collect(),
    }
}
