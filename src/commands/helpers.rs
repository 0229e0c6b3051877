//! Command helper utilities

use std::path::{Path, PathBuf};

use satchel::asset::path;
use satchel::error::{Result, SatchelError, config as config_error};

/// Resolve the application root from optional argument
///
/// If a root is provided, use it. Otherwise, resolve to the current directory.
pub fn resolve_root(root: Option<PathBuf>) -> Result<PathBuf> {
    match root {
        Some(path) => Ok(path),
        None => std::env::current_dir().map_err(|e| SatchelError::IoError {
            message: format!("Failed to get current directory: {e}"),
        }),
    }
}

/// Application-relative path (`~/...`) of a file given on the command line
pub fn app_path_for(root: &Path, file: &Path) -> Result<String> {
    let relative = if file.is_absolute() {
        file.strip_prefix(root).map_err(|_| {
            config_error::invalid(format!(
                "{} is outside the application root {}",
                file.display(),
                root.display()
            ))
        })?
    } else {
        file
    };
    Ok(path::app_relative(&relative.to_string_lossy()))
}
