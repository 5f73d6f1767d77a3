//! Command implementations

pub mod edit;
pub mod schemes;
pub mod tree;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use keel::util::config::{global_config_path, load_config, project_config_path, Config};

/// Configuration for a project rooted at `root`.
pub fn config_for(root: &Path) -> Config {
    load_config(global_config_path().as_deref(), &project_config_path(root))
}

/// Directory a description file is read relative to.
///
/// The working directory is only consulted for bare file names.
pub fn description_dir(file: &Path) -> Result<PathBuf> {
    match file.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => Ok(parent.to_path_buf()),
        None => std::env::current_dir().context("failed to get current directory"),
    }
}
