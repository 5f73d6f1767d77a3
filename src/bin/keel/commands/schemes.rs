//! `keel schemes` command

use anyhow::Result;

use crate::cli::SchemesArgs;
use keel::core::scheme::Scheme;
use keel::ops::schemes::{synthesize_schemes, SchemesOptions};

pub fn execute(args: SchemesArgs) -> Result<()> {
    let base = super::description_dir(&args.file)?;
    let config = super::config_for(&base);

    let opts = SchemesOptions {
        workspace_scheme: args.workspace_scheme,
    };
    let graph = synthesize_schemes(&args.file, &config, &opts)?;

    if args.json {
        let mut schemes: Vec<&Scheme> = graph
            .projects
            .values()
            .flat_map(|p| p.schemes.iter())
            .collect();
        schemes.extend(graph.workspace.schemes.iter());
        println!("{}", serde_json::to_string_pretty(&schemes)?);
        return Ok(());
    }

    for project in graph.projects.values() {
        println!("{} ({})", project.name, project.path.display());
        for scheme in &project.schemes {
            print_scheme(scheme);
        }
    }
    if !graph.workspace.schemes.is_empty() {
        println!("{} (workspace)", graph.workspace.name);
        for scheme in &graph.workspace.schemes {
            print_scheme(scheme);
        }
    }

    Ok(())
}

fn print_scheme(scheme: &Scheme) {
    println!("  {}", scheme.name);

    if let Some(build) = &scheme.build_action {
        let names: Vec<&str> = build.targets.iter().map(|t| t.name.as_str()).collect();
        println!("    build: {}", names.join(", "));
    }
    if let Some(test) = &scheme.test_action {
        let names: Vec<&str> = test.targets.iter().map(|t| t.target.name.as_str()).collect();
        let coverage = if test.coverage { " (coverage)" } else { "" };
        println!("    test: {}{}", names.join(", "), coverage);
    }
    if let Some(run) = &scheme.run_action {
        if let Some(executable) = &run.executable {
            println!("    run: {}", executable.name);
        }
    }
}
