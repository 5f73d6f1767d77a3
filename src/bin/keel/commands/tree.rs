//! `keel tree` command

use anyhow::Result;

use crate::cli::TreeArgs;
use keel::ops::schemes::load_graph;

pub fn execute(args: TreeArgs) -> Result<()> {
    let base = super::description_dir(&args.file)?;
    let config = super::config_for(&base);

    let graph = load_graph(&args.file, &config)?;
    graph.validate()?;

    for target in graph.topological_order()? {
        let deps: Vec<&str> = graph
            .direct_dependencies(&target)
            .into_iter()
            .map(|d| d.name.as_str())
            .collect();

        let project = graph
            .project(&target.path)
            .map(|p| p.name.as_str())
            .unwrap_or("?");

        if deps.is_empty() {
            println!("{}/{}", project, target.name);
        } else {
            println!("{}/{} -> {}", project, target.name, deps.join(", "));
        }
    }

    Ok(())
}
