//! Resolve the input/output directory pair from arguments or an interactive picker.

use std::path::{Component, PathBuf};

pub const INPUT_PROMPT: &str = "Select input directory";
pub const OUTPUT_PROMPT: &str = "Select output directory";

/// Something that can ask the user for a directory.
///
/// Returns `None` when the selection was cancelled or came back empty.
pub trait DirectoryPicker {
    fn select_directory(&mut self, title: &str) -> Option<PathBuf>;
}

/// Raw directory arguments as they arrived on the command line.
#[derive(Debug, Clone, Default)]
pub struct DirectoryArgs {
    pub input: Option<String>,
    pub output: Option<String>,
    pub positional: Vec<String>,
    pub gui: bool,
}

impl DirectoryArgs {
    /// True when no directory was supplied by any means.
    pub fn is_empty(&self) -> bool {
        self.input.is_none() && self.output.is_none() && self.positional.is_empty()
    }
}

/// Where the resolved directories came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirSource {
    Arguments,
    Picker,
}

/// Directory pair after resolution. Either side may still be missing;
/// [`crate::validate`] decides what to do about that.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDirs {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub source: DirSource,
}

/// Resolve the input and output directories.
///
/// The picker is used when `--gui` was given or when no directory was
/// supplied at all; it is prompted for input first, then output, and both
/// prompts are always shown. Otherwise named flags win, and positional
/// arguments are only consulted when neither named flag is present.
pub fn resolve_directories(args: &DirectoryArgs, picker: &mut dyn DirectoryPicker) -> ResolvedDirs {
    if args.gui || args.is_empty() {
        let input = picker
            .select_directory(INPUT_PROMPT)
            .filter(|p| !p.as_os_str().is_empty());
        tracing::info!(input = ?input, "input directory selected");
        let output = picker
            .select_directory(OUTPUT_PROMPT)
            .filter(|p| !p.as_os_str().is_empty());
        tracing::info!(output = ?output, "output directory selected");
        return ResolvedDirs {
            input,
            output,
            source: DirSource::Picker,
        };
    }

    let (input, output) = if args.input.is_some() || args.output.is_some() {
        if !args.positional.is_empty() {
            tracing::warn!(
                ignored = ?args.positional,
                "positional arguments ignored because --input/--output was given"
            );
        }
        (args.input.as_deref(), args.output.as_deref())
    } else {
        if args.positional.len() > 2 {
            tracing::warn!(ignored = ?&args.positional[2..], "extra positional arguments ignored");
        }
        (
            args.positional.first().map(String::as_str),
            args.positional.get(1).map(String::as_str),
        )
    };

    ResolvedDirs {
        input: input.and_then(normalize_dir_arg),
        output: output.and_then(normalize_dir_arg),
        source: DirSource::Arguments,
    }
}

/// Strip surrounding whitespace and quote characters and normalize the path
/// to the platform convention. Returns `None` if nothing is left.
pub fn normalize_dir_arg(raw: &str) -> Option<PathBuf> {
    let trimmed = raw.trim().trim_matches(['"', '\'']).trim();
    if trimmed.is_empty() {
        return None;
    }

    #[cfg(windows)]
    let trimmed = trimmed.replace('/', "\\");

    // Rebuilding from components drops `.` segments and duplicate or
    // trailing separators. `..` is kept as-is: it is not resolved lexically.
    let normalized: PathBuf = PathBuf::from(&*trimmed)
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect();

    if normalized.as_os_str().is_empty() {
        // The argument was only `.` segments.
        Some(PathBuf::from("."))
    } else {
        Some(normalized)
    }
}
