//! Graph of editable manifest and plugin code.
//!
//! The editor graph holds up to two projects:
//!
//! - **Plugins**: one target per plugin, containing the plugin manifest and
//!   its helper, template and resource synthesizer sources.
//! - **Manifests**: support targets (Config, Helpers, Templates,
//!   ResourceSynthesizers, Stencils, Packages) followed by one target per
//!   project manifest.
//!
//! Both are referenced by a workspace named after the edited project, and
//! every by-name dependency is resolved into the graph's adjacency map.

pub mod manifests;
pub mod plugins;

use std::path::{Path, PathBuf};

use crate::core::graph::Graph;
use crate::core::project::{AutomaticSchemes, Project};
use crate::core::scheme::{Scheme, TargetReference};
use crate::core::settings::{
    self, compose, SettingValue, SettingsDictionary, FRAMEWORK_SEARCH_PATHS, OTHER_SWIFT_FLAGS,
    SWIFT_INCLUDE_PATHS, SWIFT_VERSION,
};
use crate::core::target::Target;
use crate::core::workspace::Workspace;
use crate::mapper::dependencies::GraphDependencyResolver;
use crate::mapper::errors::MapperError;
use crate::toolchain::Toolchain;
use crate::util::fs::Globber;

use self::manifests::{
    editor_target, helpers_dependency, manifest_dependencies, manifest_dir, named_manifests,
    CONFIG_TARGET, HELPERS_TARGET, PACKAGES_TARGET, RESOURCE_SYNTHESIZERS_TARGET, STENCILS_TARGET,
    TEMPLATES_TARGET,
};
pub use self::plugins::PluginDescriptor;
use self::plugins::{helper_library_search_path, plugin_targets};

/// Name of the project holding plugin targets.
pub const PLUGINS_PROJECT: &str = "Plugins";

/// Name of the project holding manifest targets.
pub const MANIFESTS_PROJECT: &str = "Manifests";

/// Relative include path of the package manifest API inside a toolchain.
pub const MANIFEST_API_DIR: &str = "usr/lib/swift/pm/ManifestAPI";

/// Everything the editor graph is built from.
///
/// All path lists are taken in the given order; supply them sorted for
/// reproducible output.
#[derive(Debug, Clone, Default)]
pub struct EditorInput {
    /// Name of the edited project, used for the workspace
    pub name: String,

    /// Root the edited sources live under
    pub source_root: PathBuf,

    /// Directory the editor projects are generated in
    pub destination_dir: PathBuf,

    /// Directory containing the project description framework
    pub framework_dir: PathBuf,

    pub project_manifests: Vec<PathBuf>,
    pub helpers: Vec<PathBuf>,
    pub template_sources: Vec<PathBuf>,
    pub template_resources: Vec<PathBuf>,
    pub resource_synthesizers: Vec<PathBuf>,
    pub stencils: Vec<PathBuf>,
    pub plugins: Vec<PluginDescriptor>,

    /// Helper libraries already built for plugins
    pub plugin_helper_libraries: Vec<PathBuf>,

    pub config_path: Option<PathBuf>,
    pub package_manifest_path: Option<PathBuf>,

    /// Automatic scheme options of the generated projects
    pub automatic_schemes: AutomaticSchemes,
}

impl EditorInput {
    pub fn new(
        name: impl Into<String>,
        source_root: impl Into<PathBuf>,
        destination_dir: impl Into<PathBuf>,
    ) -> Self {
        EditorInput {
            name: name.into(),
            source_root: source_root.into(),
            destination_dir: destination_dir.into(),
            automatic_schemes: AutomaticSchemes::Disabled,
            ..Default::default()
        }
    }

    fn has_manifests_project(&self) -> bool {
        !self.project_manifests.is_empty() || self.package_manifest_path.is_some()
    }
}

/// Builds the editor [`Graph`] from an [`EditorInput`].
pub struct EditorGraphMapper<'a> {
    globber: &'a dyn Globber,
    toolchain: &'a dyn Toolchain,
}

impl<'a> EditorGraphMapper<'a> {
    pub fn new(globber: &'a dyn Globber, toolchain: &'a dyn Toolchain) -> Self {
        EditorGraphMapper { globber, toolchain }
    }

    /// Build the editor graph.
    ///
    /// Toolchain and discovery failures abort the whole mapping.
    pub fn map(&self, input: &EditorInput) -> Result<Graph, MapperError> {
        let language_version = self.toolchain.language_version()?;
        let base = base_settings(&input.framework_dir, &language_version);

        let plugins_project = if input.plugins.is_empty() {
            None
        } else {
            let targets = plugin_targets(&input.plugins, self.globber, &base)?;
            Some(self.project(input, PLUGINS_PROJECT, targets))
        };
        let plugin_targets = plugins_project
            .as_ref()
            .map(|p| p.targets.as_slice())
            .unwrap_or_default();

        let manifests_project = if input.has_manifests_project() {
            let targets = self.manifest_targets(input, &base, plugin_targets)?;
            Some(self.project(input, MANIFESTS_PROJECT, targets))
        } else {
            None
        };

        let projects: Vec<Project> = plugins_project.into_iter().chain(manifests_project).collect();

        let mut resolver = GraphDependencyResolver::new();
        if let Some(plugins) = projects.iter().find(|p| p.name == PLUGINS_PROJECT) {
            resolver = resolver.with_project_overrides(plugins);
        }
        let dependencies = resolver.resolve_projects(&projects);

        let workspace = Workspace::new(&input.name, &input.destination_dir)
            .with_projects(projects.iter().map(|p| p.path.clone()));

        tracing::info!(
            "editor graph: {} projects, {} targets",
            projects.len(),
            dependencies.len()
        );

        Ok(Graph {
            name: input.name.clone(),
            path: input.destination_dir.clone(),
            workspace,
            projects: projects.into_iter().map(|p| (p.path.clone(), p)).collect(),
            dependencies,
        })
    }

    fn manifest_targets(
        &self,
        input: &EditorInput,
        base: &SettingsDictionary,
        plugins: &[Target],
    ) -> Result<Vec<Target>, MapperError> {
        let search_paths: Vec<SettingsDictionary> = input
            .plugin_helper_libraries
            .iter()
            .map(|lib| {
                let dir = helper_library_search_path(lib);
                settings::settings([(
                    FRAMEWORK_SEARCH_PATHS,
                    SettingValue::array([dir.display().to_string()]),
                )])
            })
            .collect();
        let target_settings = compose(base, &search_paths);

        let config = input.config_path.as_ref().map(|path| {
            editor_target(CONFIG_TARGET, &target_settings).with_sources([path.clone()])
        });

        let helpers = (!input.helpers.is_empty()).then(|| {
            editor_target(HELPERS_TARGET, &target_settings)
                .with_sources(input.helpers.iter().cloned())
                .with_dependencies(manifest_dependencies(None, plugins))
        });
        let on_helpers = helpers_dependency(helpers.as_ref());

        let templates = (!input.template_sources.is_empty() || !input.template_resources.is_empty())
            .then(|| {
                editor_target(TEMPLATES_TARGET, &target_settings)
                    .with_sources(input.template_sources.iter().cloned())
                    .with_additional_files(input.template_resources.iter().cloned())
                    .with_dependencies(on_helpers.clone())
            });

        let resource_synthesizers = (!input.resource_synthesizers.is_empty()).then(|| {
            editor_target(RESOURCE_SYNTHESIZERS_TARGET, &target_settings)
                .with_sources(input.resource_synthesizers.iter().cloned())
                .with_dependencies(on_helpers.clone())
        });

        let stencils = (!input.stencils.is_empty()).then(|| {
            editor_target(STENCILS_TARGET, &target_settings)
                .with_additional_files(input.stencils.iter().cloned())
                .with_dependencies(on_helpers.clone())
        });

        let packages = match &input.package_manifest_path {
            Some(manifest) => Some(
                editor_target(PACKAGES_TARGET, &self.packages_settings(manifest, &target_settings)?)
                    .with_sources([manifest.clone()])
                    .with_dependencies(on_helpers.clone()),
            ),
            None => None,
        };

        let mut targets: Vec<Target> = [
            config,
            helpers.clone(),
            templates,
            resource_synthesizers,
            stencils,
            packages,
        ]
        .into_iter()
        .flatten()
        .collect();

        for (name, manifest) in named_manifests(&input.project_manifests)? {
            tracing::debug!("manifest target `{}` for {}", name, manifest.display());
            targets.push(
                editor_target(name, &target_settings)
                    .with_sources([manifest])
                    .with_dependencies(manifest_dependencies(helpers.as_ref(), plugins)),
            );
        }

        Ok(targets)
    }

    fn packages_settings(
        &self,
        manifest: &Path,
        target_settings: &SettingsDictionary,
    ) -> Result<SettingsDictionary, MapperError> {
        let tools_version = self
            .toolchain
            .tool_version(&manifest_dir(manifest))
            .map_err(|source| MapperError::ToolVersion {
                path: manifest.to_path_buf(),
                source,
            })?;
        let toolchain = self.toolchain.active_toolchain_path()?;

        let package = settings::settings([
            (
                OTHER_SWIFT_FLAGS,
                SettingValue::from(format!("-package-description-version {}", tools_version)),
            ),
            (
                SWIFT_INCLUDE_PATHS,
                SettingValue::array([toolchain.join(MANIFEST_API_DIR).display().to_string()]),
            ),
        ]);
        Ok(compose(target_settings, [&package]))
    }

    fn project(&self, input: &EditorInput, name: &str, targets: Vec<Target>) -> Project {
        let path = input.destination_dir.join(name);
        let scheme = Scheme::build_only(
            name,
            targets
                .iter()
                .map(|t| TargetReference::new(&path, &t.name))
                .collect(),
        );

        Project::new(name, path)
            .with_source_root(&input.source_root)
            .with_targets(targets)
            .with_schemes(vec![scheme])
            .with_files_group(name)
            .with_automatic_schemes(input.automatic_schemes.clone())
    }
}

/// Settings every editor target starts from.
fn base_settings(framework_dir: &Path, language_version: &str) -> SettingsDictionary {
    let mut search_paths = vec![framework_dir.display().to_string()];
    if let Some(parent) = framework_dir.parent() {
        search_paths.push(parent.display().to_string());
    }

    settings::settings([
        (FRAMEWORK_SEARCH_PATHS, SettingValue::Array(search_paths)),
        (SWIFT_VERSION, SettingValue::from(language_version)),
    ])
}
