use std::path::PathBuf;

use thiserror::Error;

pub mod backend;
pub mod config_file;
pub mod convert;
pub mod resolve;
pub mod validate;

// Re-export for convenience
pub use backend::{BackendError, PdfBackend};
pub use convert::{
    TreeScan, WalkOptions, convert_pdf_to_txt, is_pdf_path, plan_conversion, process_directory,
    scan_tree, txt_destination,
};
pub use resolve::{DirSource, DirectoryArgs, DirectoryPicker, ResolvedDirs, resolve_directories};
pub use validate::{
    DirRole, ValidationError, is_valid_directory, validate_directories, validate_directory,
};

/// A single planned PDF → text conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionJob {
    /// Absolute (or caller-relative) path of the source PDF.
    pub source: PathBuf,
    /// Where the extracted text is written.
    pub destination: PathBuf,
    /// Source path relative to the input root.
    pub relative: PathBuf,
}

/// Counters accumulated over one conversion run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConversionStats {
    pub successful: usize,
    pub failed: usize,
    /// Mirrored subdirectories created (or already present) under the output root.
    pub directories: usize,
}

impl ConversionStats {
    pub fn total(&self) -> usize {
        self.successful + self.failed
    }
}

/// Progress events emitted while converting a tree.
#[derive(Debug, Clone)]
pub enum ConvertEvent {
    /// The input tree has been walked.
    Scanned { directories: usize, files: usize },
    /// A mirrored directory was ensured under the output root.
    DirectoryCreated { path: PathBuf },
    Converting {
        index: usize,
        total: usize,
        source: PathBuf,
        destination: PathBuf,
    },
    Converted {
        index: usize,
        total: usize,
        source: PathBuf,
        destination: PathBuf,
        pages: usize,
        bytes: usize,
    },
    Failed {
        index: usize,
        total: usize,
        source: PathBuf,
        error: String,
    },
}

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to walk directory tree: {0}")]
    Walk(#[from] walkdir::Error),
}

impl ConvertError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConvertError::Io {
            path: path.into(),
            source,
        }
    }
}
