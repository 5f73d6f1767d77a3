//! Automatic scheme generation.
//!
//! Project schemes come from grouping a project's targets into buckets
//! ([`grouping`]) and turning each bucket into a scheme ([`project`]). The
//! workspace gets one umbrella scheme over all of its projects
//! ([`workspace`]).

pub mod grouping;
pub mod project;
pub mod workspace;

pub use grouping::{Role, SchemeBucket, SchemeGrouper};
pub use project::ProjectSchemeSynthesizer;
pub use workspace::WorkspaceSchemeSynthesizer;

use crate::core::graph::Graph;

/// Synthesize every project's schemes, then the workspace scheme.
///
/// Project schemes go first since relevant workspace coverage reads them.
pub fn synthesize_graph(graph: &mut Graph, workspace: &WorkspaceSchemeSynthesizer) {
    let projects = ProjectSchemeSynthesizer::new();
    for project in graph.projects.values_mut() {
        project.schemes = projects.synthesize(project);
    }
    workspace.apply(graph);
}
