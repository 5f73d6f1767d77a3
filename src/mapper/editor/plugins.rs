//! Plugin source discovery.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::core::settings::SettingsDictionary;
use crate::core::target::{Platform, Product, Target};
use crate::mapper::errors::MapperError;
use crate::util::fs::Globber;

/// File name of a plugin manifest inside the plugin root.
pub const PLUGIN_MANIFEST: &str = "Plugin.swift";

/// Plugin subdirectories and the patterns searched in each.
pub const PLUGIN_SOURCE_DIRS: &[(&str, &[&str])] = &[
    ("ProjectDescriptionHelpers", &["**/*.swift"]),
    ("Templates", &["**/*.swift", "**/*.stencil"]),
    ("ResourceSynthesizers", &["**/*.stencil"]),
];

/// A plugin located on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginDescriptor {
    pub name: String,
    /// Directory containing the plugin manifest
    pub path: PathBuf,
    /// File name of the manifest inside `path`
    #[serde(default = "default_manifest_file")]
    pub manifest_file: String,
}

fn default_manifest_file() -> String {
    PLUGIN_MANIFEST.to_string()
}

impl PluginDescriptor {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        PluginDescriptor {
            name: name.into(),
            path: path.into(),
            manifest_file: default_manifest_file(),
        }
    }

    pub fn with_manifest_file(mut self, file: impl Into<String>) -> Self {
        self.manifest_file = file.into();
        self
    }

    /// Path of the plugin manifest.
    pub fn manifest(&self) -> PathBuf {
        self.path.join(&self.manifest_file)
    }
}

/// Build one target per plugin.
///
/// Plugin names must be unique. Discovery runs for all plugins in
/// parallel. Any failed probe fails the whole call. Missing subdirectories
/// only log a warning.
pub fn plugin_targets(
    plugins: &[PluginDescriptor],
    globber: &dyn Globber,
    settings: &SettingsDictionary,
) -> Result<Vec<Target>, MapperError> {
    check_unique_names(plugins)?;

    // Workers log through the caller's subscriber.
    let dispatch = tracing::dispatcher::get_default(|d| d.clone());
    let discovered: Vec<Vec<PathBuf>> = plugins
        .par_iter()
        .map(|plugin| {
            tracing::dispatcher::with_default(&dispatch, || discover(plugin, globber))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(plugins
        .iter()
        .zip(discovered)
        .map(|(plugin, files)| {
            let mut sources = vec![plugin.manifest()];
            sources.extend(files);
            Target::new(&plugin.name, Product::StaticFramework)
                .with_platforms([Platform::Macos])
                .with_sources(sources)
                .with_settings(settings.clone())
        })
        .collect())
}

fn check_unique_names(plugins: &[PluginDescriptor]) -> Result<(), MapperError> {
    let mut seen: BTreeMap<&str, Vec<PathBuf>> = BTreeMap::new();
    for plugin in plugins {
        seen.entry(plugin.name.as_str())
            .or_default()
            .push(plugin.path.clone());
    }
    match seen.into_iter().find(|(_, paths)| paths.len() > 1) {
        Some((name, paths)) => Err(MapperError::DuplicatePlugin {
            name: name.to_string(),
            paths,
        }),
        None => Ok(()),
    }
}

fn discover(plugin: &PluginDescriptor, globber: &dyn Globber) -> Result<Vec<PathBuf>, MapperError> {
    let mut files = Vec::new();

    for (dir, patterns) in PLUGIN_SOURCE_DIRS {
        let directory = plugin.path.join(dir);
        if !globber.exists(&directory) {
            tracing::warn!(
                "plugin `{}` has no {} directory at {}",
                plugin.name,
                dir,
                directory.display()
            );
            continue;
        }

        let patterns: Vec<String> = patterns.iter().map(|p| p.to_string()).collect();
        let found = globber
            .glob(&directory, &patterns)
            .map_err(|source| MapperError::Discovery {
                plugin: plugin.name.clone(),
                source,
            })?;
        if found.is_empty() {
            tracing::warn!("no files matched in {}", directory.display());
        }
        files.extend(found);
    }

    tracing::debug!("plugin `{}`: {} discovered files", plugin.name, files.len());
    Ok(files)
}

/// Directory a helper library's search path points at.
pub fn helper_library_search_path(library: &Path) -> PathBuf {
    library
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| library.to_path_buf())
}
