//! Targets of the Manifests project.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::core::settings::SettingsDictionary;
use crate::core::target::{Platform, Product, Target, TargetDependency};
use crate::mapper::errors::MapperError;
use crate::util::fs::parent_dir_name;

pub const CONFIG_TARGET: &str = "Config";
pub const HELPERS_TARGET: &str = "Helpers";
pub const TEMPLATES_TARGET: &str = "Templates";
pub const RESOURCE_SYNTHESIZERS_TARGET: &str = "ResourceSynthesizers";
pub const STENCILS_TARGET: &str = "Stencils";
pub const PACKAGES_TARGET: &str = "Packages";

const MANIFESTS_SUFFIX: &str = "Manifests";

/// Pair each manifest with a unique target name.
///
/// Names are the parent directory's base name followed by `Manifests`. A
/// taken name gets `_` prefixed until it is free, so earlier manifests keep
/// the shorter names.
pub fn named_manifests(manifests: &[PathBuf]) -> Result<Vec<(String, PathBuf)>, MapperError> {
    let mut taken = BTreeSet::new();
    let mut named = Vec::with_capacity(manifests.len());

    for manifest in manifests {
        let dir = parent_dir_name(manifest).ok_or_else(|| MapperError::ManifestOutsideDirectory {
            path: manifest.clone(),
        })?;

        let mut name = format!("{}{}", dir, MANIFESTS_SUFFIX);
        while taken.contains(&name) {
            name.insert(0, '_');
        }
        taken.insert(name.clone());
        named.push((name, manifest.clone()));
    }

    Ok(named)
}

/// Static framework for editing support code.
pub(crate) fn editor_target(name: impl Into<String>, settings: &SettingsDictionary) -> Target {
    Target::new(name, Product::StaticFramework)
        .with_platforms([Platform::Macos])
        .with_settings(settings.clone())
}

/// Dependencies shared by the support targets: Helpers, if present.
pub(crate) fn helpers_dependency(helpers: Option<&Target>) -> Vec<TargetDependency> {
    helpers
        .map(|h| vec![TargetDependency::target(&h.name)])
        .unwrap_or_default()
}

/// Dependencies of a manifest target: Helpers, then every plugin as a sibling.
pub(crate) fn manifest_dependencies(
    helpers: Option<&Target>,
    plugins: &[Target],
) -> Vec<TargetDependency> {
    let mut deps = helpers_dependency(helpers);
    deps.extend(plugins.iter().map(|p| TargetDependency::target(&p.name)));
    deps
}

/// Directory holding a manifest file.
pub(crate) fn manifest_dir(manifest: &Path) -> PathBuf {
    manifest
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default()
}
