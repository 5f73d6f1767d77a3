//! Implementation of `keel edit`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::graph::Graph;
use crate::mapper::editor::{EditorGraphMapper, EditorInput, PluginDescriptor};
use crate::mapper::schemes::{synthesize_graph, WorkspaceSchemeSynthesizer};
use crate::toolchain::Toolchain;
use crate::util::config::{Config, EditorConfig};
use crate::util::fs::Globber;

/// Directory names inside the support directory.
const HELPERS_DIR: &str = "ProjectDescriptionHelpers";
const TEMPLATES_DIR: &str = "Templates";
const RESOURCE_SYNTHESIZERS_DIR: &str = "ResourceSynthesizers";
const STENCILS_DIR: &str = "Stencils";

/// Options for building the editor graph.
#[derive(Debug, Clone, Default)]
pub struct EditOptions {
    /// Root of the edited project
    pub root: PathBuf,

    /// Directory the editor projects are generated in
    pub destination: PathBuf,

    /// Directory containing the project description framework
    pub framework_dir: Option<PathBuf>,

    pub plugins: Vec<PluginDescriptor>,

    pub plugin_helper_libraries: Vec<PathBuf>,

    /// Generate the workspace scheme even if configuration disables it
    pub workspace_scheme: bool,
}

/// Build the editor graph for a project tree.
///
/// Discovers manifests and support sources, maps them, synthesizes schemes
/// and validates the result.
pub fn edit(
    opts: &EditOptions,
    config: &Config,
    globber: &dyn Globber,
    toolchain: &dyn Toolchain,
) -> Result<Graph> {
    let mut input = discover(opts, &config.editor, globber)?;
    // Editor projects only get automatic schemes when a grouping is configured.
    if config.schemes.grouping.is_some() {
        input.automatic_schemes = config.automatic_schemes()?;
    }

    tracing::info!(
        "mapping {} manifests and {} plugins",
        input.project_manifests.len(),
        input.plugins.len()
    );

    let mut graph = EditorGraphMapper::new(globber, toolchain).map(&input)?;
    graph.workspace.generation_options = config.workspace_generation_options()?;

    let workspace = if opts.workspace_scheme {
        WorkspaceSchemeSynthesizer::forced()
    } else {
        WorkspaceSchemeSynthesizer::new()
    };
    synthesize_graph(&mut graph, &workspace);

    graph.validate()?;
    Ok(graph)
}

/// Collect the editor inputs under `opts.root`.
pub fn discover(
    opts: &EditOptions,
    editor: &EditorConfig,
    globber: &dyn Globber,
) -> Result<EditorInput> {
    let root = &opts.root;
    let name = root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "Project".to_string());

    let mut input = EditorInput::new(name, root, &opts.destination);
    input.framework_dir = opts
        .framework_dir
        .clone()
        .unwrap_or_else(|| opts.destination.join("Frameworks"));
    input.plugins = opts
        .plugins
        .iter()
        .map(|p| p.clone().with_manifest_file(&editor.plugin_manifest_file))
        .collect();
    input.plugin_helper_libraries = opts.plugin_helper_libraries.clone();

    let support = root.join(&editor.support_dir);

    input.project_manifests = globber
        .glob(root, &[format!("**/{}", editor.manifest_file)])
        .with_context(|| format!("failed to find manifests under {}", root.display()))?;

    input.helpers = find(globber, &support.join(HELPERS_DIR), &editor.source_patterns)?;
    input.template_sources = find(globber, &support.join(TEMPLATES_DIR), &editor.source_patterns)?;
    input.template_resources =
        find(globber, &support.join(TEMPLATES_DIR), &editor.stencil_patterns)?;
    input.resource_synthesizers = find(
        globber,
        &support.join(RESOURCE_SYNTHESIZERS_DIR),
        &editor.stencil_patterns,
    )?;
    input.stencils = find(globber, &support.join(STENCILS_DIR), &editor.stencil_patterns)?;

    input.config_path = existing(globber, support.join(&editor.config_file));
    input.package_manifest_path = existing(globber, support.join(&editor.package_manifest_file));

    Ok(input)
}

fn find(globber: &dyn Globber, directory: &Path, patterns: &[String]) -> Result<Vec<PathBuf>> {
    if !globber.exists(directory) {
        tracing::warn!("no directory at {}", directory.display());
        return Ok(Vec::new());
    }
    globber
        .glob(directory, patterns)
        .with_context(|| format!("failed to search {}", directory.display()))
}

fn existing(globber: &dyn Globber, path: PathBuf) -> Option<PathBuf> {
    globber.exists(&path).then_some(path)
}

/// Parse a `NAME=PATH` plugin argument.
pub fn parse_plugin(arg: &str) -> Result<PluginDescriptor> {
    let (name, path) = arg
        .split_once('=')
        .filter(|(name, path)| !name.is_empty() && !path.is_empty())
        .with_context(|| format!("invalid plugin `{}`, expected NAME=PATH", arg))?;
    Ok(PluginDescriptor::new(name, path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::workspace::WORKSPACE_SCHEME_SUFFIX;
    use crate::test_support::{capture_logs, EditorFixture, MockGlobber, MockToolchain};
    use crate::util::fs::FsGlobber;

    fn globber() -> MockGlobber {
        MockGlobber::new()
            .with_file("/work/Shop/App/Project.swift")
            .with_file("/work/Shop/Kit/Project.swift")
            .with_file("/work/Shop/Keel/Config.swift")
            .with_file("/work/Shop/Keel/ProjectDescriptionHelpers/Team.swift")
            .with_file("/work/Shop/Keel/Templates/feature/Feature.swift")
            .with_file("/work/Shop/Keel/Templates/feature/View.stencil")
    }

    fn options() -> EditOptions {
        EditOptions {
            root: PathBuf::from("/work/Shop"),
            destination: PathBuf::from("/tmp/edit"),
            ..Default::default()
        }
    }

    #[test]
    fn test_discover_collects_support_files() {
        let input = discover(&options(), &EditorConfig::default(), &globber()).unwrap();

        assert_eq!(input.name, "Shop");
        assert_eq!(input.project_manifests.len(), 2);
        assert_eq!(input.helpers.len(), 1);
        assert_eq!(input.template_sources.len(), 1);
        assert_eq!(input.template_resources.len(), 1);
        assert!(input.stencils.is_empty());
        assert_eq!(
            input.config_path,
            Some(PathBuf::from("/work/Shop/Keel/Config.swift"))
        );
        assert!(input.package_manifest_path.is_none());
        assert_eq!(input.framework_dir, PathBuf::from("/tmp/edit/Frameworks"));
    }

    #[test]
    fn test_edit_builds_valid_graph() {
        let graph = edit(
            &options(),
            &Config::default(),
            &globber(),
            &MockToolchain::new(),
        )
        .unwrap();

        let manifests = graph.project(Path::new("/tmp/edit/Manifests")).unwrap();
        assert!(manifests.contains_target("AppManifests"));
        assert!(manifests.contains_target("KitManifests"));
        let names: Vec<_> = manifests.schemes.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Manifests"]);
        assert!(graph.workspace.schemes.is_empty());
    }

    #[test]
    fn test_edit_forced_workspace_scheme() {
        let opts = EditOptions {
            workspace_scheme: true,
            ..options()
        };
        let graph = edit(&opts, &Config::default(), &globber(), &MockToolchain::new()).unwrap();

        assert_eq!(graph.workspace.schemes.len(), 1);
        assert_eq!(
            graph.workspace.schemes[0].name,
            format!("Shop{}", WORKSPACE_SCHEME_SUFFIX)
        );
    }

    #[test]
    fn test_edit_without_toolchain_fails() {
        let err = edit(
            &options(),
            &Config::default(),
            &globber(),
            &MockToolchain::unavailable(),
        )
        .unwrap_err();
        assert!(err.downcast_ref::<crate::mapper::MapperError>().is_some());
    }

    #[test]
    fn test_discover_on_disk() {
        let tmp = tempfile::TempDir::new().unwrap();
        EditorFixture::new()
            .manifest("App")
            .manifest("Features/Kit")
            .helper("Team.swift")
            .config()
            .package()
            .write(tmp.path())
            .unwrap();

        let opts = EditOptions {
            root: tmp.path().to_path_buf(),
            destination: tmp.path().join("out"),
            ..Default::default()
        };
        let input = discover(&opts, &EditorConfig::default(), &FsGlobber).unwrap();

        assert_eq!(
            input.project_manifests,
            vec![
                tmp.path().join("App/Project.swift"),
                tmp.path().join("Features/Kit/Project.swift"),
            ]
        );
        assert_eq!(
            input.helpers,
            vec![tmp.path().join("Keel/ProjectDescriptionHelpers/Team.swift")]
        );
        assert!(input.config_path.is_some());
        assert_eq!(
            input.package_manifest_path,
            Some(tmp.path().join("Keel/Package.swift"))
        );
        assert!(input.template_sources.is_empty());
    }

    #[test]
    fn test_discover_warns_about_missing_support_directories() {
        let (input, logs) =
            capture_logs(|| discover(&options(), &EditorConfig::default(), &globber()));

        assert!(input.unwrap().stencils.is_empty());
        assert!(logs.contains("WARN"));
        assert!(logs.contains("no directory at /work/Shop/Keel/Stencils"));
        assert!(logs.contains("no directory at /work/Shop/Keel/ResourceSynthesizers"));
        assert!(!logs.contains("/work/Shop/Keel/ProjectDescriptionHelpers"));
    }

    #[test]
    fn test_edit_uses_configured_plugin_manifest() {
        let opts = EditOptions {
            plugins: vec![PluginDescriptor::new("Lint", "/work/Plugins/Lint")],
            ..options()
        };
        let mut config = Config::default();
        config.editor.plugin_manifest_file = "Plugin.keel".to_string();

        let graph = edit(&opts, &config, &globber(), &MockToolchain::new()).unwrap();

        let plugins = graph.project(Path::new("/tmp/edit/Plugins")).unwrap();
        let lint = plugins.target("Lint").unwrap();
        assert_eq!(lint.sources, vec![PathBuf::from("/work/Plugins/Lint/Plugin.keel")]);
    }

    #[test]
    fn test_edit_rejects_duplicate_plugins() {
        let opts = EditOptions {
            plugins: vec![
                parse_plugin("Lint=/work/Plugins/Lint").unwrap(),
                parse_plugin("Lint=/work/Other/Lint").unwrap(),
            ],
            ..options()
        };

        let err = edit(&opts, &Config::default(), &globber(), &MockToolchain::new()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<crate::mapper::MapperError>(),
            Some(crate::mapper::MapperError::DuplicatePlugin { name, .. }) if name == "Lint"
        ));
    }

    #[test]
    fn test_parse_plugin() {
        let plugin = parse_plugin("Lint=/plugins/Lint").unwrap();
        assert_eq!(plugin.name, "Lint");
        assert_eq!(plugin.path, PathBuf::from("/plugins/Lint"));

        assert!(parse_plugin("Lint").is_err());
        assert!(parse_plugin("=/x").is_err());
    }
}
