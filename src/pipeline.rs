use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::config::{DetectionConfig, TableConfig};
use crate::error::{TableError, TableResult};
use crate::grid::{
    assemble_table, bin_text_runs, detect_grids, extract_lines, merge_candidates, Table, TextRun,
};
use crate::operators::{PathOp, RawOperator};

/// Everything the grid pipeline needs from one page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageContent {
    /// 1-based
    pub page_number: u32,
    pub operators: Vec<PathOp>,
    pub text_runs: Vec<TextRun>,
}

/// Page as stored in a JSON page dump: operators are still raw `{code, args}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageDump {
    pub page_number: u32,
    #[serde(default)]
    pub operators: Vec<RawOperator>,
    #[serde(default)]
    pub text_runs: Vec<TextRun>,
}

impl From<PageDump> for PageContent {
    fn from(dump: PageDump) -> Self {
        Self {
            page_number: dump.page_number,
            operators: dump.operators.iter().map(PathOp::from).collect(),
            text_runs: dump.text_runs,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentTables {
    pub tables: Vec<Table>,
    pub summary: ExtractionSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionSummary {
    pub total_pages: usize,
    pub pages_with_tables: usize,
    pub total_tables: usize,
    /// Pages whose content could not be read, skipped without failing the document
    pub skipped_pages: Vec<u32>,
    pub processing_time_ms: u64,
    pub extracted_at: DateTime<Utc>,
}

/// Run the whole grid pipeline on one page. Pure: identical input always
/// gives identical output, and a page without ruled tables gives `[]`.
pub fn extract_page_tables(page: &PageContent, config: &DetectionConfig) -> Vec<Table> {
    if !page.operators.iter().any(PathOp::is_path) {
        debug!(page = page.page_number, "no path operators, skipping");
        return Vec::new();
    }

    let lines = extract_lines(&page.operators, config.line_tolerance);
    if lines.is_empty() {
        debug!(page = page.page_number, "no ruling lines, skipping");
        return Vec::new();
    }

    let candidates = detect_grids(&lines, config);
    let regions = merge_candidates(&candidates);

    let tables: Vec<Table> = regions
        .iter()
        .enumerate()
        .map(|(index, region)| {
            let cells = bin_text_runs(region, &page.text_runs);
            assemble_table(page.page_number, index, region, &cells)
        })
        .collect();

    debug!(page = page.page_number, tables = tables.len(), "page processed");
    tables
}

/// Run the page pipeline over a whole document.
///
/// Pages that failed upstream (`Err`) are logged and skipped; the remaining
/// pages are still processed. Tables come back in page order.
pub fn extract_document_tables(
    pages: Vec<TableResult<PageContent>>,
    config: &TableConfig,
) -> DocumentTables {
    let start = Instant::now();
    let total_pages = pages.len();

    let mut readable = Vec::with_capacity(total_pages);
    let mut skipped_pages = Vec::new();
    for (index, page) in pages.into_iter().enumerate() {
        match page {
            Ok(content) => readable.push(content),
            Err(e) => {
                let page_number = match &e {
                    TableError::PageContent { page_number, .. } => *page_number,
                    TableError::PageNotFound { page_number, .. } => *page_number,
                    _ => index as u32 + 1,
                };
                warn!("⚠️  Skipping table extraction for page {}: {}", page_number, e);
                skipped_pages.push(page_number);
            }
        }
    }

    let detection = &config.detection;
    let per_page: Vec<Vec<Table>> = if config.processing.parallel_pages {
        readable.par_iter().map(|page| extract_page_tables(page, detection)).collect()
    } else {
        readable.iter().map(|page| extract_page_tables(page, detection)).collect()
    };

    let pages_with_tables = per_page.iter().filter(|tables| !tables.is_empty()).count();
    let tables: Vec<Table> = per_page.into_iter().flatten().collect();
    let processing_time_ms = start.elapsed().as_millis() as u64;

    info!(
        "📊 Found {} tables on {} of {} pages in {}ms",
        tables.len(),
        pages_with_tables,
        total_pages,
        processing_time_ms
    );

    DocumentTables {
        summary: ExtractionSummary {
            total_pages,
            pages_with_tables,
            total_tables: tables.len(),
            skipped_pages,
            processing_time_ms,
            extracted_at: Utc::now(),
        },
        tables,
    }
}
