use std::path::Path;

use thiserror::Error;

pub mod mock;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("failed to open PDF: {0}")]
    OpenError(String),
    #[error("failed to extract text: {0}")]
    ExtractionError(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Trait for PDF text extraction backends.
///
/// Implementors open a document and return the text of every page in
/// document order. Everything above that (walking, path mapping, writing)
/// lives in [`crate::convert`].
pub trait PdfBackend: Send + Sync {
    /// Extract the text of each page, in document order.
    fn extract_pages(&self, path: &Path) -> Result<Vec<String>, BackendError>;

    /// Extract the full text content of a PDF file.
    ///
    /// Page texts are concatenated as returned; no separator is inserted.
    fn extract_text(&self, path: &Path) -> Result<String, BackendError> {
        Ok(self.extract_pages(path)?.concat())
    }
}
