//! CHONKER ruled-table reconstruction.
//!
//! Recovers tables from a page's vector drawing stream: ruling lines are
//! pulled out of the path operators, regular grids are detected and merged,
//! and positioned text runs are binned into the grid's cells.

pub mod config;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod logging;
pub mod operators;
pub mod pdf_source;
pub mod pipeline;

pub use config::{DetectionConfig, ProcessingConfig, TableConfig};
pub use error::{TableError, TableResult};
pub use geometry::{BoundingBox, LineSegment, Orientation};
pub use grid::{Table, TableRegion, TextRun};
pub use operators::PathOp;
pub use pdf_source::PdfPageSource;
pub use pipeline::{extract_document_tables, extract_page_tables, DocumentTables, PageContent};
