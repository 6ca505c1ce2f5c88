//! Platform configuration paths and per-run data paths.

use crate::constants::APP_NAME;
use crate::error::{Error, Result};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Get the configuration directory for the current platform.
///
/// - Linux: `~/.config/crownmap/`
/// - macOS: `~/Library/Application Support/crownmap/`
/// - Windows: `%APPDATA%\crownmap\`
pub fn config_dir() -> Result<PathBuf> {
    ProjectDirs::from("", "", APP_NAME)
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or(Error::ConfigDirNotFound)
}

/// Get the full path to the config file.
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

/// Files and directories used by one run.
///
/// Every image lookup goes through `base_dir`; nothing depends on the
/// process working directory beyond how the user spelled the input paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPaths {
    /// Inventory table.
    pub inventory: PathBuf,
    /// Frame metadata table.
    pub metadata: PathBuf,
    /// Directory images (and relative model files) are resolved against.
    pub base_dir: PathBuf,
    /// Directory annotated images and tables are written to.
    pub output_dir: PathBuf,
}

impl DataPaths {
    /// Resolve run paths.
    ///
    /// `base_dir` defaults to the directory holding the metadata table and
    /// `output_dir` defaults to `base_dir`.
    pub fn new(
        inventory: PathBuf,
        metadata: PathBuf,
        base_dir: Option<PathBuf>,
        output_dir: Option<PathBuf>,
    ) -> Self {
        let base_dir = base_dir.unwrap_or_else(|| {
            metadata
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
        });
        let output_dir = output_dir.unwrap_or_else(|| base_dir.clone());

        Self {
            inventory,
            metadata,
            base_dir,
            output_dir,
        }
    }
}
