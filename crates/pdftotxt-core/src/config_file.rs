use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::convert::WalkOptions;

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    pub walk: Option<WalkConfig>,
    pub display: Option<DisplayConfig>,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WalkConfig {
    pub follow_links: Option<bool>,
    pub skip_hidden: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    pub color: Option<bool>,
    pub progress: Option<bool>,
    pub theme: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
}

impl ConfigFile {
    /// Walk options with unset fields falling back to the defaults.
    pub fn walk_options(&self) -> WalkOptions {
        let walk = self.walk.as_ref();
        WalkOptions {
            follow_links: walk.and_then(|w| w.follow_links).unwrap_or(false),
            skip_hidden: walk.and_then(|w| w.skip_hidden).unwrap_or(false),
        }
    }

    pub fn color(&self) -> Option<bool> {
        self.display.as_ref().and_then(|d| d.color)
    }

    pub fn progress(&self) -> Option<bool> {
        self.display.as_ref().and_then(|d| d.progress)
    }

    pub fn theme(&self) -> Option<&str> {
        self.display.as_ref().and_then(|d| d.theme.as_deref())
    }

    pub fn log_level(&self) -> Option<&str> {
        self.logging.as_ref().and_then(|l| l.level.as_deref())
    }
}

/// Platform config directory path: `<config_dir>/pdftotxt/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("pdftotxt").join("config.toml"))
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Result of the config cascade. Files that could not be read or parsed are
/// skipped and returned in `skipped` so the caller can report them once
/// logging is up.
#[derive(Debug, Default)]
pub struct LoadedConfig {
    pub config: ConfigFile,
    pub skipped: Vec<ConfigError>,
}

/// Load config by cascading CWD `.pdftotxt.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> LoadedConfig {
    let mut skipped = Vec::new();
    let mut load = |path: &Path| match load_from_path(path) {
        Ok(config) => config,
        Err(e) => {
            skipped.push(e);
            None
        }
    };

    let platform = config_path().and_then(|p| load(&p));
    let cwd = load(Path::new(".pdftotxt.toml"));

    let config = match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    };
    LoadedConfig { config, skipped }
}

/// Load a config from a specific path. Returns `Ok(None)` if the file
/// doesn't exist.
pub fn load_from_path(path: &Path) -> Result<Option<ConfigFile>, ConfigError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source: e,
            });
        }
    };
    let config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: e,
    })?;
    tracing::debug!(path = %path.display(), "loaded config");
    Ok(Some(config))
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    ConfigFile {
        walk: Some(WalkConfig {
            follow_links: overlay
                .walk
                .as_ref()
                .and_then(|w| w.follow_links)
                .or_else(|| base.walk.as_ref().and_then(|w| w.follow_links)),
            skip_hidden: overlay
                .walk
                .as_ref()
                .and_then(|w| w.skip_hidden)
                .or_else(|| base.walk.as_ref().and_then(|w| w.skip_hidden)),
        }),
        display: Some(DisplayConfig {
            color: overlay
                .display
                .as_ref()
                .and_then(|d| d.color)
                .or_else(|| base.display.as_ref().and_then(|d| d.color)),
            progress: overlay
                .display
                .as_ref()
                .and_then(|d| d.progress)
                .or_else(|| base.display.as_ref().and_then(|d| d.progress)),
            theme: overlay
                .display
                .as_ref()
                .and_then(|d| d.theme.clone())
                .or_else(|| base.display.as_ref().and_then(|d| d.theme.clone())),
        }),
        logging: Some(LoggingConfig {
            level: overlay
                .logging
                .as_ref()
                .and_then(|l| l.level.clone())
                .or_else(|| base.logging.as_ref().and_then(|l| l.level.clone())),
        }),
    }
}
