use std::path::Path;

use mupdf::{Document, TextPageFlags};

use pdftotxt_core::{BackendError, PdfBackend};

/// MuPDF-based implementation of [`PdfBackend`].
///
/// This crate is the sole AGPL island: it isolates the mupdf dependency
/// (which is AGPL-3.0) so that the walker, validator and CLI plumbing do
/// not transitively depend on it.
///
/// Each page is read through MuPDF's structured text, block by block and
/// line by line, with a newline after every line. Nothing is filtered out
/// and no layout is reconstructed.
#[derive(Debug, Default, Clone, Copy)]
pub struct MupdfBackend;

impl MupdfBackend {
    pub fn new() -> Self {
        Self
    }
}

impl PdfBackend for MupdfBackend {
    fn extract_pages(&self, path: &Path) -> Result<Vec<String>, BackendError> {
        if !path.is_file() {
            return Err(BackendError::OpenError(format!(
                "no such file: {}",
                path.display()
            )));
        }

        // MuPDF only opens UTF-8 paths; anything else goes through memory.
        let document = match path.to_str() {
            Some(path_str) => Document::open(path_str),
            None => Document::from_bytes(&std::fs::read(path)?, "application/pdf"),
        }
        .map_err(|e| BackendError::OpenError(e.to_string()))?;

        let mut pages_text = Vec::new();

        for page_result in document
            .pages()
            .map_err(|e| BackendError::ExtractionError(e.to_string()))?
        {
            let page = page_result.map_err(|e| BackendError::ExtractionError(e.to_string()))?;
            let text_page = page
                .to_text_page(TextPageFlags::empty())
                .map_err(|e| BackendError::ExtractionError(e.to_string()))?;

            let mut page_text = String::new();
            for block in text_page.blocks() {
                for line in block.lines() {
                    let line_text: String = line
                        .chars()
                        .map(|c| c.char().unwrap_or('\u{FFFD}'))
                        .collect();
                    page_text.push_str(&line_text);
                    page_text.push('\n');
                }
            }
            pages_text.push(page_text);
        }

        tracing::debug!(path = %path.display(), pages = pages_text.len(), "extracted");
        Ok(pages_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Assemble a minimal PDF with one Helvetica text line per page,
    /// computing the cross-reference offsets as we go.
    fn build_pdf(pages: &[&str]) -> Vec<u8> {
        let n = pages.len();
        let font_id = 3 + 2 * n;
        let mut objects: Vec<String> = Vec::new();

        objects.push("<< /Type /Catalog /Pages 2 0 R >>".to_string());
        let kids: Vec<String> = (0..n).map(|i| format!("{} 0 R", 3 + 2 * i)).collect();
        objects.push(format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids.join(" "),
            n
        ));
        for (i, text) in pages.iter().enumerate() {
            let content_id = 4 + 2 * i;
            objects.push(format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
                 /Resources << /Font << /F1 {font_id} 0 R >> >> /Contents {content_id} 0 R >>"
            ));
            let stream = format!("BT /F1 24 Tf 72 700 Td ({text}) Tj ET");
            objects.push(format!(
                "<< /Length {} >>\nstream\n{}\nendstream",
                stream.len(),
                stream
            ));
        }
        objects.push("<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string());

        let mut out = String::from("%PDF-1.4\n");
        let mut offsets = Vec::new();
        for (i, body) in objects.iter().enumerate() {
            offsets.push(out.len());
            out.push_str(&format!("{} 0 obj\n{}\nendobj\n", i + 1, body));
        }
        let xref_at = out.len();
        out.push_str(&format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1));
        for off in offsets {
            out.push_str(&format!("{:010} 00000 n \n", off));
        }
        out.push_str(&format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref_at
        ));
        out.into_bytes()
    }

    #[test]
    fn extracts_pages_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("two.pdf");
        std::fs::write(&path, build_pdf(&["Hello", "World"])).unwrap();

        let pages = MupdfBackend::new().extract_pages(&path).unwrap();

        assert_eq!(pages.len(), 2);
        assert!(pages[0].contains("Hello"), "{:?}", pages[0]);
        assert!(pages[1].contains("World"), "{:?}", pages[1]);

        let text = MupdfBackend::new().extract_text(&path).unwrap();
        let hello = text.find("Hello").unwrap();
        let world = text.find("World").unwrap();
        assert!(hello < world);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn non_utf8_file_name_is_extracted() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(OsStr::from_bytes(b"caf\xe9.pdf"));
        assert!(path.to_str().is_none());
        std::fs::write(&path, build_pdf(&["Latin1"])).unwrap();

        let pages = MupdfBackend::new().extract_pages(&path).unwrap();

        assert_eq!(pages.len(), 1);
        assert!(pages[0].contains("Latin1"), "{:?}", pages[0]);
    }

    #[test]
    fn missing_file_is_open_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = MupdfBackend::new()
            .extract_pages(&dir.path().join("absent.pdf"))
            .unwrap_err();
        assert!(matches!(err, BackendError::OpenError(_)));
    }
}
