use std::path::{Path, PathBuf};
use clap::{Parser, ValueEnum};
use anyhow::{Context, Result};
use tracing::info;

use chonker_tables::grid::{tables_to_csv, tables_to_html, tables_to_markdown};
use chonker_tables::logging::{init_logging, LoggingConfig, PerformanceTimer};
use chonker_tables::pipeline::PageDump;
use chonker_tables::{
    extract_document_tables, DocumentTables, PageContent, PdfPageSource, TableConfig, TableError,
    TableResult,
};

#[derive(Parser)]
#[command(name = "extract_tables")]
#[command(about = "Reconstruct ruled tables from the drawing stream of PDF pages")]
struct Cli {
    /// Input PDF, or a JSON page dump (`.json`) of operators and text runs
    input: PathBuf,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// TOML config file (defaults plus CHONKER_TABLES_* environment overrides otherwise)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Only process these 1-based pages, comma separated
    #[arg(long, value_delimiter = ',')]
    pages: Vec<u32>,

    /// Process pages one after another instead of in parallel
    #[arg(long)]
    sequential: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Markdown,
    Html,
    Csv,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let _log_guard = init_logging(&LoggingConfig {
        level: (if cli.verbose { "debug" } else { "info" }).to_string(),
        ..LoggingConfig::default()
    })?;

    let mut config = match &cli.config {
        Some(path) => TableConfig::load_from_file(path)?,
        None => TableConfig::load_from_env(),
    };
    config.detection.validate()?;
    if cli.sequential {
        config.processing.parallel_pages = false;
    }

    let timer = PerformanceTimer::start(format!("table extraction for {:?}", cli.input));
    let pages = read_pages(&cli.input, &cli.pages).await?;
    timer.checkpoint("pages read");

    let result = tokio::task::spawn_blocking(move || extract_document_tables(pages, &config))
        .await
        .context("table extraction task failed")?;
    drop(timer);

    let rendered = render(&result, cli.format)?;
    match &cli.output {
        Some(path) => {
            tokio::fs::write(path, rendered)
                .await
                .with_context(|| format!("Failed to write {:?}", path))?;
            info!("📝 Tables saved to: {:?}", path);
        }
        None => println!("{}", rendered),
    }

    eprintln!("  \\___/>");
    eprintln!("  [o-·-o]");
    eprintln!("  (\")~(\")  🎉 Table Extraction Complete!");
    eprintln!("          Pages: {}", result.summary.total_pages);
    eprintln!("          Tables found: {}", result.summary.total_tables);
    if !result.summary.skipped_pages.is_empty() {
        eprintln!("          Skipped pages: {:?}", result.summary.skipped_pages);
    }
    eprintln!("          Processing time: {}ms", result.summary.processing_time_ms);

    Ok(())
}

async fn read_pages(input: &Path, only: &[u32]) -> Result<Vec<TableResult<PageContent>>> {
    if !input.exists() {
        return Err(anyhow::anyhow!("Input file not found: {:?}", input));
    }

    let is_json = input
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let pages: Vec<TableResult<PageContent>> = if is_json {
        let content = tokio::fs::read_to_string(input).await?;
        let dump: Vec<PageDump> = serde_json::from_str(&content)
            .with_context(|| format!("Invalid page dump {:?}", input))?;
        info!("Read {} pages from page dump {:?}", dump.len(), input);
        dump.into_iter().map(|page| Ok(PageContent::from(page))).collect()
    } else {
        let bytes = tokio::fs::read(input).await?;
        tokio::task::spawn_blocking(move || -> TableResult<Vec<TableResult<PageContent>>> {
            let source = PdfPageSource::from_bytes(&bytes)?;
            Ok(source.all_pages())
        })
        .await
        .context("PDF reader task failed")??
    };

    if only.is_empty() {
        return Ok(pages);
    }

    Ok(pages
        .into_iter()
        .filter(|page| match page {
            Ok(content) => only.contains(&content.page_number),
            Err(err) => page_of(err).map_or(true, |page_number| only.contains(&page_number)),
        })
        .collect())
}

/// Page a read failure belongs to; document-level failures have none.
fn page_of(err: &TableError) -> Option<u32> {
    match err {
        TableError::PageContent { page_number, .. } | TableError::PageNotFound { page_number, .. } => {
            Some(*page_number)
        }
        _ => None,
    }
}

fn render(result: &DocumentTables, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Json => serde_json::to_string_pretty(result)?,
        OutputFormat::Markdown => tables_to_markdown(&result.tables),
        OutputFormat::Html => tables_to_html(&result.tables),
        OutputFormat::Csv => tables_to_csv(&result.tables),
    })
}
