use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use pdftotxt_core::config_file::{self, LoadedConfig};
use pdftotxt_core::{
    DirectoryArgs, WalkOptions, plan_conversion, process_directory, resolve_directories,
    validate_directories,
};
use pdftotxt_mupdf::MupdfBackend;

mod logging;
mod output;
mod picker;

use output::{ColorMode, Reporter};
use picker::{TerminalPicker, Theme};

/// Recursively convert every PDF under a directory into a plain-text file,
/// mirroring the directory tree.
///
/// With no directories given, an interactive picker asks for the input and
/// the output directory.
#[derive(Parser, Debug)]
#[command(name = "pdftotxt", version, about, long_about = None)]
struct Cli {
    /// Input and output directories, used when -i/-o are not given
    #[arg(value_name = "DIR", num_args = 0..)]
    dirs: Vec<String>,

    /// Directory to search for PDF files
    #[arg(short, long, value_name = "DIR")]
    input: Option<String>,

    /// Directory to write the .txt files into (created if missing)
    #[arg(short, long, value_name = "DIR")]
    output: Option<String>,

    /// Choose both directories interactively, ignoring any given
    #[arg(short, long)]
    gui: bool,

    /// Validate and list the planned conversions without writing anything
    #[arg(long)]
    dry_run: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Show a progress bar
    #[arg(long)]
    progress: bool,

    /// Follow symbolic links while walking the input tree
    #[arg(long)]
    follow_links: bool,

    /// Skip files and directories whose name starts with '.'
    #[arg(long)]
    skip_hidden: bool,

    /// Also write logs to this file
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Config file to use instead of the default locations
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Color theme for the directory picker
    #[arg(long, value_enum)]
    theme: Option<ThemeName>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ThemeName {
    Hacker,
    Modern,
}

impl ThemeName {
    fn as_str(self) -> &'static str {
        match self {
            ThemeName::Hacker => "hacker",
            ThemeName::Modern => "modern",
        }
    }
}

/// `--config`, then `PDFTOTXT_CONFIG`, then the platform/CWD cascade.
///
/// An explicitly named file must exist and parse; files in the cascade are
/// skipped with a warning instead.
fn load_config(explicit: Option<PathBuf>) -> anyhow::Result<LoadedConfig> {
    let explicit = explicit.or_else(|| {
        std::env::var_os("PDFTOTXT_CONFIG")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    });
    let Some(path) = explicit else {
        return Ok(config_file::load_config());
    };
    let config = config_file::load_from_path(&path)
        .with_context(|| format!("cannot load config file {}", path.display()))?
        .with_context(|| format!("config file {} does not exist", path.display()))?;
    Ok(LoadedConfig {
        config,
        skipped: Vec::new(),
    })
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let LoadedConfig { config, skipped } = load_config(cli.config.clone())?;
    let _log_guard = logging::init(config.log_level(), cli.log_file.as_deref())?;
    for error in &skipped {
        tracing::warn!(%error, "ignoring config file");
    }

    let no_color_env = std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty());
    let color = ColorMode(!cli.no_color && !no_color_env && config.color().unwrap_or(true));
    let progress = cli.progress || config.progress().unwrap_or(false);

    let config_walk = config.walk_options();
    let walk = WalkOptions {
        follow_links: cli.follow_links || config_walk.follow_links,
        skip_hidden: cli.skip_hidden || config_walk.skip_hidden,
    };

    let theme_name = match cli.theme {
        Some(name) => name.as_str(),
        None => config.theme().unwrap_or("hacker"),
    };

    let args = DirectoryArgs {
        input: cli.input,
        output: cli.output,
        positional: cli.dirs,
        gui: cli.gui,
    };
    let mut picker = TerminalPicker::new(Theme::named(theme_name));
    let resolved = resolve_directories(&args, &mut picker);
    tracing::debug!(?resolved, "directories resolved");

    let (input_dir, output_dir) = match validate_directories(&resolved, &walk) {
        Ok(dirs) => dirs,
        Err(errors) => {
            for error in &errors {
                tracing::debug!(%error, "validation failed");
            }
            output::print_validation_errors(&mut std::io::stderr(), &errors, color)?;
            anyhow::bail!(
                "{} validation error(s); nothing was converted",
                errors.len()
            );
        }
    };

    let mut stdout = std::io::stdout();
    output::print_directories(&mut stdout, &input_dir, &output_dir, resolved.source, color)?;

    if cli.dry_run {
        let scan = plan_conversion(&input_dir, &output_dir, &walk)?;
        output::print_plan(&mut stdout, &scan, &output_dir, color)?;
        return Ok(());
    }

    tracing::info!(
        input = %input_dir.display(),
        output = %output_dir.display(),
        ?walk,
        "starting conversion"
    );

    let backend = MupdfBackend::new();
    let mut reporter = Reporter::new(Box::new(stdout), color, progress);
    let stats = process_directory(&input_dir, &output_dir, &backend, &walk, |event| {
        if let Err(e) = reporter.handle(&event) {
            tracing::warn!(error = %e, "failed to write progress");
        }
    })?;
    reporter.finish(&stats)?;

    tracing::info!(
        successful = stats.successful,
        failed = stats.failed,
        directories = stats.directories,
        "conversion finished"
    );
    Ok(())
}
