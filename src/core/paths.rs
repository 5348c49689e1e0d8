// src/core/paths.rs

use crate::constants::{CONFIG_DIR_NAME, CONFIG_FILENAME};
use colored::Colorize;
use lazy_static::lazy_static;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use thiserror::Error;

lazy_static! {
    static ref CONFIG_DIR: Mutex<Option<PathBuf>> = Mutex::new(None);
}

#[derive(Error, Debug)]
pub enum PathError {
    #[error("Could not find system config directory.")]
    ConfigDirNotFound,
    #[error("Could not determine the home directory.")]
    HomeDirNotFound,
    #[error("Failed to expand path '{path}': {reason}")]
    Expansion { path: String, reason: String },
    #[error("Starting directory '{requested}' is invalid and fallback '{fallback}' is also unusable.")]
    NoUsableStartingDir { requested: String, fallback: String },
}

/// Returns the path to the fzf-open configuration directory (`~/.config/fzf-open`).
///
/// This function is memoized: the first call computes and caches the path,
/// subsequent calls return the cached value. The directory is not created here.
pub fn get_config_dir() -> Result<PathBuf, PathError> {
    let mut cached = CONFIG_DIR.lock().unwrap_or_else(PoisonError::into_inner);

    if let Some(path) = &*cached {
        return Ok(path.clone());
    }

    // --- Cache miss: compute the path for the first time ---

    // 1. Find the system's generic config directory (`$XDG_CONFIG_HOME` or `~/.config`).
    let config_path = dirs::config_dir()
        .ok_or(PathError::ConfigDirNotFound)?
        .join(CONFIG_DIR_NAME);

    // 2. Remember it. Creating the directory is left to whoever writes into it.
    *cached = Some(config_path.clone());
    Ok(config_path)
}

/// Returns the path to the default `config.toml`.
pub fn get_config_file_path() -> Result<PathBuf, PathError> {
    get_config_dir().map(|dir| dir.join(CONFIG_FILENAME))
}

/// Expands `~` and environment variables (`$VAR`, `${VAR}`) in a path string.
pub fn expand_path(path: &str) -> Result<PathBuf, PathError> {
    let expanded = shellexpand::full(path).map_err(|e| PathError::Expansion {
        path: path.to_string(),
        reason: e.to_string(),
    })?;
    Ok(PathBuf::from(expanded.into_owned()))
}

/// Validates the picker's starting directory.
///
/// An invalid `requested` directory falls back to `home` with a warning. If the home
/// directory is missing or unusable too, this is a configuration error.
pub fn resolve_starting_dir(requested: &Path, home: Option<&Path>) -> Result<PathBuf, PathError> {
    // 1. The requested directory wins when it is usable.
    if requested.is_dir() {
        return Ok(dunce::canonicalize(requested).unwrap_or_else(|_| requested.to_path_buf()));
    }

    // 2. Otherwise warn and try the home directory.
    let home = home.ok_or(PathError::HomeDirNotFound)?;
    eprintln!(
        "{} starting directory '{}' is invalid, falling back to '{}'.",
        "Warning:".yellow(),
        requested.display(),
        home.display()
    );

    // 3. With no usable directory at all the picker cannot start.
    if home.is_dir() {
        Ok(dunce::canonicalize(home).unwrap_or_else(|_| home.to_path_buf()))
    } else {
        Err(PathError::NoUsableStartingDir {
            requested: requested.display().to_string(),
            fallback: home.display().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_expand_path_handles_home_and_vars() {
        let home = dirs::home_dir().unwrap();
        assert_eq!(expand_path("~/docs").unwrap(), home.join("docs"));

        let cargo_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap();
        assert_eq!(
            expand_path("$CARGO_MANIFEST_DIR/src").unwrap(),
            PathBuf::from(format!("{cargo_dir}/src"))
        );
    }

    #[test]
    fn test_expand_path_reports_unknown_variables() {
        let result = expand_path("$FZF_OPEN_SURELY_UNSET_VARIABLE/x");
        assert!(matches!(result, Err(PathError::Expansion { .. })));
    }

    #[test]
    fn test_valid_starting_dir_is_kept() {
        let dir = TempDir::new().unwrap();
        let resolved = resolve_starting_dir(dir.path(), None).unwrap();
        assert_eq!(resolved, dunce::canonicalize(dir.path()).unwrap());
    }

    #[test]
    fn test_invalid_starting_dir_falls_back_to_home() {
        let home = TempDir::new().unwrap();
        let resolved =
            resolve_starting_dir(Path::new("/no/such/dir/anywhere"), Some(home.path())).unwrap();
        assert_eq!(resolved, dunce::canonicalize(home.path()).unwrap());
    }

    #[test]
    fn test_unusable_home_is_an_error() {
        let result = resolve_starting_dir(
            Path::new("/no/such/dir/anywhere"),
            Some(Path::new("/no/such/home/either")),
        );
        assert!(matches!(result, Err(PathError::NoUsableStartingDir { .. })));

        let result = resolve_starting_dir(Path::new("/no/such/dir/anywhere"), None);
        assert!(matches!(result, Err(PathError::HomeDirNotFound)));
    }
}
