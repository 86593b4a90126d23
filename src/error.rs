use thiserror::Error;

/// Main error type for CHONKER table extraction
///
/// The grid pipeline itself never fails: unclassifiable geometry is dropped and
/// a page without tables is an empty result. Errors only come from the edges,
/// where pages are read and configuration is loaded.
#[derive(Error, Debug)]
pub enum TableError {
    #[error("PDF could not be loaded: {message}")]
    PdfLoad {
        message: String,
        #[source]
        source: Option<lopdf::Error>,
    },

    #[error("Page {page_number} not found (document has {page_count} pages)")]
    PageNotFound { page_number: u32, page_count: usize },

    #[error("Failed to read content of page {page_number}: {message}")]
    PageContent {
        page_number: u32,
        message: String,
        #[source]
        source: Option<lopdf::Error>,
    },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("File I/O error: {path}")]
    FileIO {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("General error: {0}")]
    General(#[from] anyhow::Error),
}

impl TableError {
    /// Create a PDF load error with the underlying lopdf error
    pub fn pdf_load(message: impl Into<String>, source: lopdf::Error) -> Self {
        Self::PdfLoad {
            message: message.into(),
            source: Some(source),
        }
    }

    /// Create a page content error, optionally carrying the lopdf error
    pub fn page_content(
        page_number: u32,
        message: impl Into<String>,
        source: Option<lopdf::Error>,
    ) -> Self {
        Self::PageContent {
            page_number,
            message: message.into(),
            source,
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a file I/O error
    pub fn file_io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::FileIO {
            path: path.into(),
            source,
        }
    }

    /// Check if error is recoverable (the rest of the document can still be processed)
    pub fn is_recoverable(&self) -> bool {
        match self {
            TableError::PageContent { .. } => true,
            TableError::PageNotFound { .. } => true,
            TableError::PdfLoad { .. } => false,
            TableError::Configuration { .. } => false,
            TableError::FileIO { .. } => false,
            _ => true,
        }
    }
}

/// Result type alias for convenience
pub type TableResult<T> = Result<T, TableError>;
