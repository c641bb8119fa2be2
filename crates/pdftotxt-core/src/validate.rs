//! Pre-flight checks on the resolved directories.

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;
use walkdir::WalkDir;

use crate::convert::{WalkOptions, is_hidden, is_pdf_path, is_regular_file};
use crate::resolve::ResolvedDirs;

/// Which side of the conversion a directory is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirRole {
    Input,
    Output,
}

impl fmt::Display for DirRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DirRole::Input => f.write_str("input"),
            DirRole::Output => f.write_str("output"),
        }
    }
}

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("no {0} directory provided")]
    Missing(DirRole),
    #[error("{role} directory does not exist: {}", path.display())]
    NotFound { role: DirRole, path: PathBuf },
    #[error("{role} path is not a directory: {}", path.display())]
    NotADirectory { role: DirRole, path: PathBuf },
    #[error("no PDF files found in {}", .0.display())]
    NoPdfFiles(PathBuf),
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Check a single directory for its role.
///
/// - Either role: an absent or empty path is rejected.
/// - Input: must exist, be a directory, and contain at least one `.pdf`
///   file (case-insensitive) that a walk with `options` would reach.
/// - Output: anything non-empty is accepted; it is created later.
pub fn validate_directory(
    path: Option<&Path>,
    role: DirRole,
    options: &WalkOptions,
) -> Result<(), ValidationError> {
    let path = match path {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => return Err(ValidationError::Missing(role)),
    };

    if role == DirRole::Output {
        return Ok(());
    }

    let metadata = match std::fs::metadata(path) {
        Ok(m) => m,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ValidationError::NotFound {
                role,
                path: path.to_path_buf(),
            });
        }
        Err(e) => {
            return Err(ValidationError::Io {
                path: path.to_path_buf(),
                source: e,
            });
        }
    };
    if !metadata.is_dir() {
        return Err(ValidationError::NotADirectory {
            role,
            path: path.to_path_buf(),
        });
    }

    match contains_pdf(path, options) {
        Ok(true) => Ok(()),
        Ok(false) => Err(ValidationError::NoPdfFiles(path.to_path_buf())),
        Err(e) => Err(ValidationError::Io {
            path: path.to_path_buf(),
            source: e.into(),
        }),
    }
}

/// Boolean form of [`validate_directory`]; logs the reason on failure.
pub fn is_valid_directory(path: Option<&Path>, role: DirRole, options: &WalkOptions) -> bool {
    match validate_directory(path, role, options) {
        Ok(()) => true,
        Err(e) => {
            tracing::error!(%role, error = %e, "invalid directory");
            false
        }
    }
}

/// Validate both sides and return the concrete paths, or every problem found.
pub fn validate_directories(
    resolved: &ResolvedDirs,
    options: &WalkOptions,
) -> Result<(PathBuf, PathBuf), Vec<ValidationError>> {
    let mut errors = Vec::new();
    if let Err(e) = validate_directory(resolved.input.as_deref(), DirRole::Input, options) {
        errors.push(e);
    }
    if let Err(e) = validate_directory(resolved.output.as_deref(), DirRole::Output, options) {
        errors.push(e);
    }

    match (&resolved.input, &resolved.output) {
        (Some(input), Some(output)) if errors.is_empty() => Ok((input.clone(), output.clone())),
        _ => Err(errors),
    }
}

/// True if a walk of `root` with `options` reaches a `.pdf` file. Stops at
/// the first hit. Unreadable entries below the root are skipped; a root that
/// cannot be read is an error.
fn contains_pdf(root: &Path, options: &WalkOptions) -> Result<bool, walkdir::Error> {
    let walker = WalkDir::new(root)
        .follow_links(options.follow_links)
        .into_iter()
        .filter_entry(|entry| !is_hidden(entry, options));

    for entry in walker {
        match entry {
            Ok(entry) => {
                if is_regular_file(&entry) && is_pdf_path(entry.path()) {
                    return Ok(true);
                }
            }
            Err(err) if err.depth() == 0 => return Err(err),
            Err(err) => tracing::debug!(error = %err, "skipping unreadable entry"),
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::DirSource;

    const WALK: WalkOptions = WalkOptions {
        follow_links: false,
        skip_hidden: false,
    };

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, b"%PDF-1.4\n").unwrap();
    }

    #[test]
    fn missing_path_names_the_side() {
        let err = validate_directory(None, DirRole::Input, &WALK).unwrap_err();
        assert!(matches!(err, ValidationError::Missing(DirRole::Input)));
        assert_eq!(err.to_string(), "no input directory provided");

        let err =
            validate_directory(Some(Path::new("")), DirRole::Output, &WALK).unwrap_err();
        assert_eq!(err.to_string(), "no output directory provided");
    }

    #[test]
    fn nonexistent_input_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err =
            validate_directory(Some(&dir.path().join("absent")), DirRole::Input, &WALK).unwrap_err();
        assert!(matches!(err, ValidationError::NotFound { .. }));
    }

    #[test]
    fn file_as_input_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.pdf");
        touch(&file);
        let err = validate_directory(Some(&file), DirRole::Input, &WALK).unwrap_err();
        assert!(matches!(err, ValidationError::NotADirectory { .. }));
    }

    #[test]
    fn input_without_pdfs_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.txt"), "hi").unwrap();
        std::fs::create_dir(dir.path().join("looks.pdf")).unwrap();

        let err = validate_directory(Some(dir.path()), DirRole::Input, &WALK).unwrap_err();
        assert!(matches!(err, ValidationError::NoPdfFiles(_)));
    }

    #[test]
    fn nested_uppercase_pdf_is_enough() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("a/b/c/REPORT.PDF"));
        assert!(validate_directory(Some(dir.path()), DirRole::Input, &WALK).is_ok());
        assert!(is_valid_directory(Some(dir.path()), DirRole::Input, &WALK));
    }

    #[test]
    fn output_need_not_exist() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("not/yet/created");
        assert!(validate_directory(Some(&out), DirRole::Output, &WALK).is_ok());
        assert!(!out.exists());
    }

    #[test]
    fn both_sides_are_reported_together() {
        let resolved = ResolvedDirs {
            input: None,
            output: None,
            source: DirSource::Picker,
        };
        let errors = validate_directories(&resolved, &WALK).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(matches!(errors[0], ValidationError::Missing(DirRole::Input)));
        assert!(matches!(errors[1], ValidationError::Missing(DirRole::Output)));
    }

    #[test]
    fn valid_pair_is_returned() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("in/x.pdf"));
        let resolved = ResolvedDirs {
            input: Some(dir.path().join("in")),
            output: Some(dir.path().join("out")),
            source: DirSource::Arguments,
        };
        let (input, output) = validate_directories(&resolved, &WALK).unwrap();
        assert_eq!(input, dir.path().join("in"));
        assert_eq!(output, dir.path().join("out"));
    }

    #[test]
    fn pdfs_only_under_hidden_dirs_fail_when_skipping_hidden() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join(".hidden/a.pdf"));
        let skip_hidden = WalkOptions {
            skip_hidden: true,
            ..WALK
        };

        assert!(validate_directory(Some(dir.path()), DirRole::Input, &WALK).is_ok());
        let err = validate_directory(Some(dir.path()), DirRole::Input, &skip_hidden).unwrap_err();
        assert!(matches!(err, ValidationError::NoPdfFiles(_)));
    }

    #[cfg(unix)]
    #[test]
    fn pdfs_behind_symlinked_dir_count_only_when_following_links() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("real/b.pdf"));
        let input = dir.path().join("in");
        std::fs::create_dir(&input).unwrap();
        std::os::unix::fs::symlink(dir.path().join("real"), input.join("linked")).unwrap();
        let follow = WalkOptions {
            follow_links: true,
            ..WALK
        };

        let err = validate_directory(Some(&input), DirRole::Input, &WALK).unwrap_err();
        assert!(matches!(err, ValidationError::NoPdfFiles(_)));
        assert!(validate_directory(Some(&input), DirRole::Input, &follow).is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_input_root_is_an_io_error() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("locked");
        touch(&input.join("a.pdf"));
        std::fs::set_permissions(&input, std::fs::Permissions::from_mode(0o000)).unwrap();
        // The superuser bypasses permission bits.
        let readable = std::fs::read_dir(&input).is_ok();

        let result = validate_directory(Some(&input), DirRole::Input, &WALK);
        std::fs::set_permissions(&input, std::fs::Permissions::from_mode(0o755)).unwrap();

        if !readable {
            assert!(matches!(result, Err(ValidationError::Io { .. })), "{result:?}");
        }
    }
}
