//! Walk an input tree and convert every PDF into a mirrored `.txt` file.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use crate::backend::{BackendError, PdfBackend};
use crate::{ConversionJob, ConversionStats, ConvertError, ConvertEvent};

/// Knobs for the directory walk.
#[derive(Debug, Clone, Copy, Default)]
pub struct WalkOptions {
    /// Descend into symlinked directories.
    pub follow_links: bool,
    /// Skip files and directories whose name starts with `.`.
    pub skip_hidden: bool,
}

/// Everything found under the input root, in walk order.
#[derive(Debug, Clone, Default)]
pub struct TreeScan {
    /// Subdirectories relative to the input root (the root itself excluded).
    pub directories: Vec<PathBuf>,
    pub jobs: Vec<ConversionJob>,
}

/// Page and byte counts for one converted file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Converted {
    pub pages: usize,
    pub bytes: usize,
}

/// Returns true if the path's extension is `pdf`, ignoring case.
pub fn is_pdf_path(path: &Path) -> bool {
    path.extension()
        .map(|e| e.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}

/// Map a PDF path relative to the input root onto its text file under `output_dir`.
///
/// Only the leaf's final extension changes: `a/b/report.v2.PDF` becomes
/// `<output_dir>/a/b/report.v2.txt`.
pub fn txt_destination(relative_pdf: &Path, output_dir: &Path) -> PathBuf {
    output_dir.join(relative_pdf).with_extension("txt")
}

/// Walk `input_dir` and collect mirrored directories and conversion jobs.
///
/// Siblings are visited in file-name order. If `output_dir` sits inside the
/// input tree, that subtree is left out of the walk.
pub fn scan_tree(
    input_dir: &Path,
    output_dir: &Path,
    options: &WalkOptions,
) -> Result<TreeScan, ConvertError> {
    let pruned = nested_output(input_dir, output_dir);
    if let Some(ref rel) = pruned {
        tracing::debug!(subtree = %rel.display(), "output directory is inside input, skipping it");
    }

    let walker = WalkDir::new(input_dir)
        .follow_links(options.follow_links)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| keep_entry(entry, input_dir, options, pruned.as_deref()));

    let mut scan = TreeScan::default();
    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(err) if err.depth() == 0 => return Err(ConvertError::Walk(err)),
            Err(err) => {
                tracing::warn!(error = %err, "skipping unreadable entry");
                continue;
            }
        };
        if entry.depth() == 0 {
            continue;
        }

        let relative = match entry.path().strip_prefix(input_dir) {
            Ok(rel) => rel.to_path_buf(),
            Err(_) => continue,
        };

        if entry.file_type().is_dir() {
            scan.directories.push(relative);
        } else if is_regular_file(&entry) && is_pdf_path(entry.path()) {
            scan.jobs.push(ConversionJob {
                source: entry.path().to_path_buf(),
                destination: txt_destination(&relative, output_dir),
                relative,
            });
        }
    }

    Ok(scan)
}

/// Scan without touching the filesystem. Used for dry runs.
pub fn plan_conversion(
    input_dir: &Path,
    output_dir: &Path,
    options: &WalkOptions,
) -> Result<TreeScan, ConvertError> {
    scan_tree(input_dir, output_dir, options)
}

/// Convert every PDF under `input_dir` into a `.txt` file under `output_dir`.
///
/// The output root and every mirrored subdirectory are created, including
/// subdirectories without PDFs. A failing file is logged, reported through
/// `on_event` and counted; it never stops the batch. Only a failure to create
/// the output root or to read the input root is returned as an error.
pub fn process_directory(
    input_dir: &Path,
    output_dir: &Path,
    backend: &dyn PdfBackend,
    options: &WalkOptions,
    mut on_event: impl FnMut(ConvertEvent),
) -> Result<ConversionStats, ConvertError> {
    std::fs::create_dir_all(output_dir).map_err(|e| ConvertError::io(output_dir, e))?;

    let scan = scan_tree(input_dir, output_dir, options)?;
    on_event(ConvertEvent::Scanned {
        directories: scan.directories.len(),
        files: scan.jobs.len(),
    });

    let mut stats = ConversionStats::default();

    for rel in &scan.directories {
        let target = output_dir.join(rel);
        match std::fs::create_dir_all(&target) {
            Ok(()) => {
                stats.directories += 1;
                on_event(ConvertEvent::DirectoryCreated { path: target });
            }
            // Files below it will fail on write and be counted there.
            Err(e) => {
                tracing::error!(path = %target.display(), error = %e, "failed to create directory")
            }
        }
    }

    let total = scan.jobs.len();
    for (index, job) in scan.jobs.into_iter().enumerate() {
        tracing::info!(
            source = %job.source.display(),
            destination = %job.destination.display(),
            "converting"
        );
        on_event(ConvertEvent::Converting {
            index,
            total,
            source: job.source.clone(),
            destination: job.destination.clone(),
        });

        match convert_pdf_to_txt(&job.source, &job.destination, backend) {
            Ok(converted) => {
                stats.successful += 1;
                on_event(ConvertEvent::Converted {
                    index,
                    total,
                    source: job.source,
                    destination: job.destination,
                    pages: converted.pages,
                    bytes: converted.bytes,
                });
            }
            Err(e) => {
                stats.failed += 1;
                tracing::error!(source = %job.source.display(), error = %e, "conversion failed");
                on_event(ConvertEvent::Failed {
                    index,
                    total,
                    source: job.source,
                    error: e.to_string(),
                });
            }
        }
    }

    tracing::info!(
        successful = stats.successful,
        failed = stats.failed,
        directories = stats.directories,
        "conversion complete"
    );
    Ok(stats)
}

/// Extract every page of `source` and write the concatenated text to
/// `destination` as UTF-8, replacing any existing file.
///
/// Extraction happens before the destination is opened, so a PDF that
/// fails to parse leaves no text file behind. A write that fails part-way
/// removes the partial file.
pub fn convert_pdf_to_txt(
    source: &Path,
    destination: &Path,
    backend: &dyn PdfBackend,
) -> Result<Converted, ConvertError> {
    let pages = extract_guarded(source, backend)?;

    let bytes = write_pages(destination, &pages).map_err(|e| ConvertError::io(destination, e))?;

    Ok(Converted {
        pages: pages.len(),
        bytes,
    })
}

/// Run the backend, turning a panic inside it into an extraction error.
fn extract_guarded(source: &Path, backend: &dyn PdfBackend) -> Result<Vec<String>, BackendError> {
    match panic::catch_unwind(AssertUnwindSafe(|| backend.extract_pages(source))) {
        Ok(result) => result,
        Err(payload) => {
            let msg = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "malformed document".to_string());
            Err(BackendError::ExtractionError(format!(
                "extraction panicked: {msg}"
            )))
        }
    }
}

/// Write `pages` to `destination`. If the file was opened but a write fails,
/// the partial file is removed; a file that could not be opened is left alone.
fn write_pages(destination: &Path, pages: &[String]) -> std::io::Result<usize> {
    let file = File::create(destination)?;
    let result = write_all_pages(BufWriter::new(file), pages);
    if result.is_err() {
        let _ = std::fs::remove_file(destination);
    }
    result
}

fn write_all_pages(mut writer: impl Write, pages: &[String]) -> std::io::Result<usize> {
    let mut bytes = 0;
    for page in pages {
        writer.write_all(page.as_bytes())?;
        bytes += page.len();
    }
    writer.flush()?;
    Ok(bytes)
}

fn keep_entry(
    entry: &DirEntry,
    input_dir: &Path,
    options: &WalkOptions,
    pruned: Option<&Path>,
) -> bool {
    if is_hidden(entry, options) {
        return false;
    }
    if let Some(pruned) = pruned
        && entry.path().strip_prefix(input_dir).ok() == Some(pruned)
    {
        return false;
    }
    true
}

/// True for a dot-entry below the root when `skip_hidden` is set.
pub(crate) fn is_hidden(entry: &DirEntry, options: &WalkOptions) -> bool {
    options.skip_hidden
        && entry.depth() > 0
        && entry.file_name().to_string_lossy().starts_with('.')
}

/// Regular file, or a symlink that points at one.
pub(crate) fn is_regular_file(entry: &DirEntry) -> bool {
    entry.file_type().is_file() || (entry.path_is_symlink() && entry.path().is_file())
}

/// If `output_dir` lies strictly inside `input_dir`, its path relative to the input root.
fn nested_output(input_dir: &Path, output_dir: &Path) -> Option<PathBuf> {
    let input = comparable(input_dir);
    let output = comparable(output_dir);
    let rel = output.strip_prefix(&input).ok()?;
    if rel.as_os_str().is_empty() {
        None
    } else {
        Some(rel.to_path_buf())
    }
}

fn comparable(path: &Path) -> PathBuf {
    std::fs::canonicalize(path)
        .or_else(|_| std::path::absolute(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pdf_extension_is_case_insensitive() {
        assert!(is_pdf_path(Path::new("a.pdf")));
        assert!(is_pdf_path(Path::new("dir/A.PDF")));
        assert!(is_pdf_path(Path::new("mixed.PdF")));
        assert!(!is_pdf_path(Path::new("a.pdf.txt")));
        assert!(!is_pdf_path(Path::new("pdf")));
        assert!(!is_pdf_path(Path::new("notes.txt")));
        assert!(!is_pdf_path(Path::new(".pdf")));
    }

    #[test]
    fn destination_keeps_relative_path_and_swaps_extension() {
        let out = Path::new("/out");
        assert_eq!(
            txt_destination(Path::new("a.pdf"), out),
            PathBuf::from("/out/a.txt")
        );
        assert_eq!(
            txt_destination(Path::new("sub/deeper/B.PDF"), out),
            PathBuf::from("/out/sub/deeper/B.txt")
        );
        assert_eq!(
            txt_destination(Path::new("report.v2.pdf"), out),
            PathBuf::from("/out/report.v2.txt")
        );
    }

    #[test]
    fn nested_output_detects_subdirectory() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in");
        std::fs::create_dir_all(input.join("out")).unwrap();

        assert_eq!(
            nested_output(&input, &input.join("out")),
            Some(PathBuf::from("out"))
        );
        assert_eq!(nested_output(&input, &input), None);
        assert_eq!(nested_output(&input, &dir.path().join("elsewhere")), None);
    }

    #[test]
    fn scan_sorts_and_skips_non_pdfs() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in");
        std::fs::create_dir_all(input.join("b_dir")).unwrap();
        std::fs::create_dir_all(input.join("a_dir/empty")).unwrap();
        std::fs::write(input.join("z.pdf"), "").unwrap();
        std::fs::write(input.join("a_dir/y.PDF"), "").unwrap();
        std::fs::write(input.join("b_dir/readme.md"), "").unwrap();

        let out = dir.path().join("out");
        let scan = scan_tree(&input, &out, &WalkOptions::default()).unwrap();

        assert_eq!(
            scan.directories,
            vec![
                PathBuf::from("a_dir"),
                PathBuf::from("a_dir/empty"),
                PathBuf::from("b_dir"),
            ]
        );
        let rels: Vec<_> = scan.jobs.iter().map(|j| j.relative.clone()).collect();
        assert_eq!(rels, vec![PathBuf::from("a_dir/y.PDF"), PathBuf::from("z.pdf")]);
        assert_eq!(scan.jobs[0].destination, out.join("a_dir/y.txt"));
    }

    #[test]
    fn scan_skips_hidden_when_asked() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in");
        std::fs::create_dir_all(input.join(".cache")).unwrap();
        std::fs::write(input.join(".cache/c.pdf"), "").unwrap();
        std::fs::write(input.join("v.pdf"), "").unwrap();
        let out = dir.path().join("out");

        let all = scan_tree(&input, &out, &WalkOptions::default()).unwrap();
        assert_eq!(all.jobs.len(), 2);

        let visible = scan_tree(
            &input,
            &out,
            &WalkOptions {
                skip_hidden: true,
                ..WalkOptions::default()
            },
        )
        .unwrap();
        assert_eq!(visible.jobs.len(), 1);
        assert!(visible.directories.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn unopenable_destination_keeps_previous_output() {
        use std::os::unix::fs::PermissionsExt;

        use crate::backend::mock::MockBackend;

        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("a.pdf");
        std::fs::write(&source, MockBackend::document(&["new"])).unwrap();
        let destination = dir.path().join("a.txt");
        std::fs::write(&destination, "previous run").unwrap();
        std::fs::set_permissions(&destination, std::fs::Permissions::from_mode(0o444)).unwrap();
        // The superuser bypasses permission bits.
        let writable = std::fs::OpenOptions::new().write(true).open(&destination).is_ok();

        let result = convert_pdf_to_txt(&source, &destination, &MockBackend::new());

        if !writable {
            assert!(matches!(result, Err(ConvertError::Io { .. })));
            assert_eq!(std::fs::read_to_string(&destination).unwrap(), "previous run");
        }
    }

    #[test]
    fn write_errors_propagate_from_any_page() {
        struct FailAfterFirst(usize);

        impl Write for FailAfterFirst {
            fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
                if self.0 == 0 {
                    return Err(std::io::Error::other("disk full"));
                }
                self.0 -= 1;
                Ok(buf.len())
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let pages = vec!["one".to_string(), "two".to_string()];
        assert_eq!(write_all_pages(FailAfterFirst(2), &pages).unwrap(), 6);
        assert!(write_all_pages(FailAfterFirst(1), &pages).is_err());
    }

    #[test]
    fn scan_of_missing_root_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = scan_tree(
            &dir.path().join("missing"),
            &dir.path().join("out"),
            &WalkOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ConvertError::Walk(_)));
    }
}
