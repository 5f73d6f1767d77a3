//! `keel edit` command

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::cli::EditArgs;
use keel::core::graph::{Graph, GraphTarget};
use keel::ops::edit::{edit, parse_plugin, EditOptions};
use keel::toolchain::SystemToolchain;
use keel::util::diagnostic::{emit, Diagnostic};
use keel::util::fs::FsGlobber;

pub fn execute(args: EditArgs, no_color: bool) -> Result<()> {
    let root = match args.path {
        Some(path) => path,
        None => std::env::current_dir().context("failed to get current directory")?,
    };
    let root = root
        .canonicalize()
        .with_context(|| format!("project root not found: {}", root.display()))?;

    let plugins = args
        .plugins
        .iter()
        .map(|p| parse_plugin(p))
        .collect::<Result<Vec<_>>>()?;

    let destination = args.destination.unwrap_or_else(|| default_destination(&root));

    let opts = EditOptions {
        root: root.clone(),
        destination,
        framework_dir: args.framework_dir,
        plugins,
        plugin_helper_libraries: args.helper_libraries,
        workspace_scheme: args.workspace_scheme,
    };

    let config = super::config_for(&root);
    let graph = edit(&opts, &config, &FsGlobber, &SystemToolchain::new())?;

    if graph.projects.is_empty() {
        emit(
            &Diagnostic::warning("nothing to edit")
                .with_context(format!("no manifests or plugins found under {}", root.display())),
            !no_color,
        );
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&graph)?);
    } else {
        print_summary(&graph);
    }

    Ok(())
}

fn default_destination(root: &std::path::Path) -> PathBuf {
    let name = root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "Project".to_string());
    std::env::temp_dir().join("keel").join(name)
}

fn print_summary(graph: &Graph) {
    println!(
        "Workspace {} ({})",
        graph.workspace.name,
        graph.workspace.path.display()
    );

    for path in &graph.workspace.projects {
        let Some(project) = graph.project(path) else {
            continue;
        };
        println!("  {} ({} targets)", project.name, project.targets.len());

        for target in &project.targets {
            let deps: Vec<&str> = graph
                .direct_dependencies(&GraphTarget::new(&project.path, &target.name))
                .into_iter()
                .map(|d| d.name.as_str())
                .collect();
            if deps.is_empty() {
                println!("    {}", target.name);
            } else {
                println!("    {} -> {}", target.name, deps.join(", "));
            }
        }
    }

    for scheme in &graph.workspace.schemes {
        println!("  scheme {}", scheme.name);
    }
}
