//! Mock extraction backend for testing.

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{BackendError, PdfBackend};

/// Form feed, used by [`MockBackend`] as the page separator.
pub const PAGE_BREAK: char = '\u{0C}';

/// A hand-rolled backend implementing [`PdfBackend`] without a PDF library.
///
/// A "document" is a UTF-8 file whose first line starts with `%PDF-`; the
/// rest of the file is the page texts separated by form feeds. Anything
/// else is rejected with [`BackendError::OpenError`], which makes it easy
/// to plant corrupt files in a test tree.
///
/// Supports:
/// - Call counting via [`call_count()`](MockBackend::call_count).
/// - Recording the paths it was asked to open, in order.
#[derive(Default)]
pub struct MockBackend {
    call_count: AtomicUsize,
    opened: Mutex<Vec<PathBuf>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of extraction calls made so far.
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Paths passed to [`PdfBackend::extract_pages`], in call order.
    pub fn opened(&self) -> Vec<PathBuf> {
        self.opened.lock().map(|v| v.clone()).unwrap_or_default()
    }

    /// Render page texts in the format this backend reads.
    pub fn document(pages: &[&str]) -> String {
        let mut doc = String::from("%PDF-mock\n");
        doc.push_str(&pages.join(&PAGE_BREAK.to_string()));
        doc
    }
}

impl PdfBackend for MockBackend {
    fn extract_pages(&self, path: &Path) -> Result<Vec<String>, BackendError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut opened) = self.opened.lock() {
            opened.push(path.to_path_buf());
        }

        let bytes = std::fs::read(path)?;
        if !bytes.starts_with(b"%PDF-") {
            return Err(BackendError::OpenError("missing %PDF- header".into()));
        }
        let text = String::from_utf8(bytes)
            .map_err(|e| BackendError::ExtractionError(e.to_string()))?;

        let body = match text.split_once('\n') {
            Some((_, body)) => body,
            None => return Ok(Vec::new()),
        };
        Ok(body.split(PAGE_BREAK).map(str::to_string).collect())
    }
}
