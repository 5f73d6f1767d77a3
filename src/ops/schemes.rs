//! Implementation of `keel schemes` and `keel tree`.
//!
//! Both commands read a description of projects (and optionally their
//! workspace) from TOML or JSON, build the graph and synthesize schemes.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::core::graph::Graph;
use crate::core::project::{Project, ProjectOptions};
use crate::core::workspace::{GenerationOptions, Workspace};
use crate::mapper::dependencies::GraphDependencyResolver;
use crate::mapper::schemes::{synthesize_graph, WorkspaceSchemeSynthesizer};
use crate::util::config::Config;
use crate::util::diagnostic::suggestions;
use crate::util::fs::{normalize_path, read_to_string};

/// A project as written in a description file.
///
/// Options left out fall back to the `[schemes]` configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectEntry {
    #[serde(default)]
    pub options: Option<ProjectOptions>,

    #[serde(flatten)]
    pub project: Project,
}

/// A workspace as written in a description file.
///
/// Generation options left out fall back to the `[workspace]`
/// configuration. An empty project list means every described project.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkspaceEntry {
    #[serde(default)]
    pub generation_options: Option<GenerationOptions>,

    #[serde(flatten)]
    pub workspace: Workspace,
}

/// Contents of a description file.
#[derive(Debug, Clone, Deserialize)]
pub struct Description {
    #[serde(default)]
    pub workspace: Option<WorkspaceEntry>,

    #[serde(default)]
    pub projects: Vec<ProjectEntry>,
}

/// Options for synthesizing schemes.
#[derive(Debug, Clone, Default)]
pub struct SchemesOptions {
    /// Generate the workspace scheme even if configuration disables it
    pub workspace_scheme: bool,
}

/// Parse TOML or JSON by file extension.
fn parse<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let contents = read_to_string(path)?;
    match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => toml::from_str(&contents)
            .with_context(|| format!("failed to parse {}", path.display())),
        Some("json") => serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse {}", path.display())),
        _ => bail!(
            "unsupported description file: {}\nhelp: {}",
            path.display(),
            suggestions::BAD_DESCRIPTION
        ),
    }
}

/// Load a description file.
pub fn load_description(path: &Path) -> Result<Description> {
    parse(path)
}

/// Build the graph of a description, without schemes synthesized.
///
/// Relative project paths are taken from `base`.
pub fn build_graph(description: Description, config: &Config, base: &Path) -> Result<Graph> {
    let absolute = |path: &Path| -> PathBuf { normalize_path(&base.join(path)) };

    let default_options = ProjectOptions {
        automatic_schemes: config.automatic_schemes()?,
    };

    let mut projects = Vec::with_capacity(description.projects.len());
    for entry in description.projects {
        let mut project = entry.project;
        project.path = absolute(&project.path);
        if project.source_root.as_os_str().is_empty() {
            project.source_root = project.path.clone();
        }
        project.options = entry.options.unwrap_or_else(|| default_options.clone());
        projects.push(project);
    }

    let workspace = match description.workspace {
        Some(entry) => {
            let mut workspace = entry.workspace;
            workspace.path = absolute(&workspace.path);
            workspace.projects = workspace.projects.iter().map(|p| absolute(p)).collect();
            workspace.generation_options = match entry.generation_options {
                Some(options) => options,
                None => config.workspace_generation_options()?,
            };
            workspace
        }
        None => {
            let name = projects
                .first()
                .map(|p| p.name.clone())
                .unwrap_or_else(|| "Workspace".to_string());
            Workspace::new(name, base)
                .with_generation_options(config.workspace_generation_options()?)
        }
    };

    let mut workspace = workspace;
    if workspace.projects.is_empty() {
        workspace.projects = projects.iter().map(|p| p.path.clone()).collect();
    }

    let dependencies = GraphDependencyResolver::new().resolve_projects(&projects);

    Ok(Graph {
        name: workspace.name.clone(),
        path: workspace.path.clone(),
        workspace,
        projects: projects.into_iter().map(|p| (p.path.clone(), p)).collect(),
        dependencies,
    })
}

/// Load a description, synthesize every scheme and validate the graph.
pub fn synthesize_schemes(path: &Path, config: &Config, opts: &SchemesOptions) -> Result<Graph> {
    let description = load_description(path)?;
    let mut graph = build_graph(description, config, base_dir(path))?;

    let workspace = if opts.workspace_scheme {
        WorkspaceSchemeSynthesizer::forced()
    } else {
        WorkspaceSchemeSynthesizer::new()
    };
    synthesize_graph(&mut graph, &workspace);

    tracing::info!(
        "synthesized schemes for {} projects",
        graph.projects.len()
    );

    graph.validate()?;
    Ok(graph)
}

/// Load a serialized graph, or build one from a description.
pub fn load_graph(path: &Path, config: &Config) -> Result<Graph> {
    match parse::<Graph>(path) {
        Ok(graph) => Ok(graph),
        Err(graph_err) => {
            tracing::debug!("{} is not a serialized graph: {:#}", path.display(), graph_err);
            let description = load_description(path)?;
            build_graph(description, config, base_dir(path))
        }
    }
}

fn base_dir(path: &Path) -> &Path {
    path.parent().unwrap_or_else(|| Path::new("."))
}
