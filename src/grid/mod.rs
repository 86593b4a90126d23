//! Ruled-table reconstruction, one stage per module:
//! lines -> detector -> merger -> binner -> assembler.

pub mod lines;
pub mod detector;
pub mod merger;
pub mod binner;
pub mod assembler;
pub mod formatter;

pub use lines::{extract_lines, PageLines};
pub use detector::{detect_grids, GridCandidate};
pub use merger::{merge_candidates, TableRegion};
pub use binner::{bin_text_runs, CellMap, TextRun};
pub use assembler::{assemble_table, Table};
pub use formatter::{TableFormatter, ColumnAlignment, tables_to_csv, tables_to_html, tables_to_markdown};
