//! # Config Loader
//!
//! Loads `config.toml`, writing the defaults on first run, and layers command-line
//! overrides on top. Precedence is CLI flag, then config file, then built-in default.

use crate::{
    core::paths::{self, PathError},
    models::Config,
};
use colored::Colorize;
use lazy_static::lazy_static;
use regex::Regex;
use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file '{0}' does not exist.")]
    NotFound(PathBuf),
    #[error("Could not read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{path}': {source}")]
    TomlParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error(
        "Config file '{path}' uses the old KEY=VALUE format. Rewrite it as TOML with these keys: \
         OPENER -> fallback_opener, TERMINAL -> terminal, STARTING_DIR -> starting_dir, \
         WIN_TITLE_FLAG -> win_title_flag, WIN_TITLE -> win_title, SPAWN_TERM -> spawn_term. \
         Deleting the file regenerates the defaults."
    )]
    LegacyFormat { path: PathBuf },
    #[error("Failed to serialize default config to TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    #[error(transparent)]
    Path(#[from] PathError),
}

lazy_static! {
    /// A line of the pre-TOML config format, e.g. `SPAWN_TERM=true`.
    static ref LEGACY_KEY_LINE: Regex =
        Regex::new(r"(?m)^\s*(OPENER|TERMINAL|STARTING_DIR|WIN_TITLE_FLAG|WIN_TITLE|SPAWN_TERM)\s*=")
            .expect("legacy key pattern is valid");
}

/// Values given on the command line. `None` leaves the config value untouched.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub spawn_term: Option<bool>,
    pub keep_open: Option<bool>,
    pub interactive_shell: Option<bool>,
    pub starting_dir: Option<String>,
    pub terminal: Option<String>,
    pub fallback_opener: Option<String>,
}

/// A loaded configuration and the file it came from.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: Config,
    pub path: PathBuf,
}

/// Loads the configuration from `explicit`, or from the default location.
///
/// An explicitly requested file must exist. When the default file is missing, the
/// defaults are written there so the user has something to edit; failing to write
/// them is only a warning.
pub fn load(explicit: Option<&Path>) -> Result<LoadedConfig, ConfigError> {
    let path = match explicit {
        Some(p) => {
            // `~` and `$VAR` can only be expanded in paths that are valid UTF-8.
            let expanded = match p.to_str() {
                Some(raw) => paths::expand_path(raw)?,
                None => p.to_path_buf(),
            };
            if !expanded.exists() {
                return Err(ConfigError::NotFound(expanded));
            }
            expanded
        }
        None => paths::get_config_file_path()?,
    };

    if !path.exists() {
        let config = Config::default();
        if let Err(e) = write_default(&path, &config) {
            eprintln!(
                "{} could not write default config to '{}': {}",
                "Warning:".yellow(),
                path.display(),
                e
            );
        }
        return Ok(LoadedConfig { config, path });
    }

    let config = read_from(&path)?;
    log::debug!("Loaded config from '{}'", path.display());
    Ok(LoadedConfig { config, path })
}

/// Parses a config file. Missing keys take their default values; unknown keys are errors.
pub fn read_from(path: &Path) -> Result<Config, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| {
        if LEGACY_KEY_LINE.is_match(&content) {
            ConfigError::LegacyFormat {
                path: path.to_path_buf(),
            }
        } else {
            ConfigError::TomlParse {
                path: path.to_path_buf(),
                source,
            }
        }
    })
}

fn write_default(path: &Path, config: &Config) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let toml_string = toml::to_string_pretty(config).map_err(ConfigError::from)?;
    fs::write(path, toml_string)?;
    log::debug!("Wrote default config to '{}'", path.display());
    Ok(())
}

/// Applies command-line overrides on top of a loaded config.
pub fn apply_overrides(config: &mut Config, overrides: &Overrides) {
    if let Some(v) = overrides.spawn_term {
        config.spawn_term = v;
    }
    if let Some(v) = overrides.keep_open {
        config.keep_open = v;
    }
    if let Some(v) = overrides.interactive_shell {
        config.interactive_shell = v;
    }
    if let Some(v) = &overrides.starting_dir {
        config.starting_dir = v.clone();
    }
    if let Some(v) = &overrides.terminal {
        config.terminal = v.clone();
    }
    if let Some(v) = &overrides.fallback_opener {
        config.fallback_opener = v.clone();
    }
}
