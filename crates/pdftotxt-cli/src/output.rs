use std::io::Write;
use std::path::Path;

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use pdftotxt_core::{ConversionStats, ConvertEvent, DirSource, TreeScan, ValidationError};

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

/// Console reporter for a conversion run.
///
/// Per-file lines go to `out`. With a progress bar attached they are
/// printed above the bar so the two don't interleave.
pub struct Reporter {
    out: Box<dyn Write>,
    color: ColorMode,
    bar: Option<ProgressBar>,
}

impl Reporter {
    pub fn new(out: Box<dyn Write>, color: ColorMode, progress: bool) -> Self {
        let bar = progress.then(|| {
            let bar = ProgressBar::new(0);
            if let Ok(style) =
                ProgressStyle::with_template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
            {
                bar.set_style(style.progress_chars("=> "));
            }
            bar
        });
        Self { out, color, bar }
    }

    fn line(&mut self, text: String) -> std::io::Result<()> {
        match &self.bar {
            // A hidden bar (no terminal) drops println output
            Some(bar) if !bar.is_hidden() => {
                bar.println(text);
                Ok(())
            }
            _ => writeln!(self.out, "{}", text),
        }
    }

    /// Report a single event from the converter.
    pub fn handle(&mut self, event: &ConvertEvent) -> std::io::Result<()> {
        match event {
            ConvertEvent::Scanned { directories, files } => {
                if let Some(bar) = &self.bar {
                    bar.set_length(*files as u64);
                }
                let text = format!(
                    "Found {} PDF file(s) in {} subdirector{}",
                    files,
                    directories,
                    if *directories == 1 { "y" } else { "ies" }
                );
                self.line(text)?;
            }
            ConvertEvent::DirectoryCreated { .. } => {}
            ConvertEvent::Converting {
                index,
                total,
                source,
                destination,
            } => {
                if let Some(bar) = &self.bar
                    && let Some(name) = source.file_name()
                {
                    bar.set_message(name.to_string_lossy().to_string());
                }
                let text = format!(
                    "[{}/{}] converting {} to {}",
                    index + 1,
                    total,
                    source.display(),
                    destination.display()
                );
                self.line(text)?;
            }
            ConvertEvent::Converted { .. } => {
                if let Some(bar) = &self.bar {
                    bar.inc(1);
                }
            }
            ConvertEvent::Failed {
                index,
                total,
                error,
                ..
            } => {
                let text = if self.color.enabled() {
                    format!("[{}/{}] -> {} {}", index + 1, total, "FAILED:".red(), error)
                } else {
                    format!("[{}/{}] -> FAILED: {}", index + 1, total, error)
                };
                self.line(text)?;
                if let Some(bar) = &self.bar {
                    bar.inc(1);
                }
            }
        }
        Ok(())
    }

    /// Clear the progress bar and print the summary line.
    pub fn finish(&mut self, stats: &ConversionStats) -> std::io::Result<()> {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
        print_summary(&mut self.out, stats, self.color)
    }
}

/// Print the final `Converted N file(s), M failed` line.
pub fn print_summary(
    w: &mut dyn Write,
    stats: &ConversionStats,
    color: ColorMode,
) -> std::io::Result<()> {
    writeln!(w)?;
    if color.enabled() {
        let converted = format!("Converted {} file(s)", stats.successful);
        let failed = format!("{} failed", stats.failed);
        if stats.failed > 0 {
            writeln!(w, "{}, {}", converted.bold(), failed.red().bold())?;
        } else {
            writeln!(w, "{}, {}", converted.bold(), failed)?;
        }
    } else {
        writeln!(
            w,
            "Converted {} file(s), {} failed",
            stats.successful, stats.failed
        )?;
    }
    Ok(())
}

/// Print every validation problem, one per line.
pub fn print_validation_errors(
    w: &mut dyn Write,
    errors: &[ValidationError],
    color: ColorMode,
) -> std::io::Result<()> {
    for error in errors {
        if color.enabled() {
            writeln!(w, "{} {}", "error:".red().bold(), error)?;
        } else {
            writeln!(w, "error: {}", error)?;
        }
    }
    Ok(())
}

/// Echo the directories that will be used, when they came from the picker.
pub fn print_directories(
    w: &mut dyn Write,
    input: &Path,
    output: &Path,
    source: DirSource,
    color: ColorMode,
) -> std::io::Result<()> {
    if source != DirSource::Picker {
        return Ok(());
    }
    for (label, path) in [("Input: ", input), ("Output:", output)] {
        if color.enabled() {
            writeln!(w, "{} {}", label.dimmed(), path.display())?;
        } else {
            writeln!(w, "{} {}", label, path.display())?;
        }
    }
    Ok(())
}

/// Print a dry-run plan: the directories that would be created and every
/// planned conversion.
pub fn print_plan(
    w: &mut dyn Write,
    scan: &TreeScan,
    output: &Path,
    color: ColorMode,
) -> std::io::Result<()> {
    let header = "[DRY RUN]";
    if color.enabled() {
        writeln!(w, "{} nothing will be written", header.yellow().bold())?;
    } else {
        writeln!(w, "{} nothing will be written", header)?;
    }

    writeln!(w, "Would create {} directories:", scan.directories.len())?;
    for dir in &scan.directories {
        writeln!(w, "  {}", output.join(dir).display())?;
    }

    writeln!(w, "Would convert {} PDF file(s):", scan.jobs.len())?;
    for job in &scan.jobs {
        writeln!(
            w,
            "  {} -> {}",
            job.source.display(),
            job.destination.display()
        )?;
    }
    Ok(())
}
