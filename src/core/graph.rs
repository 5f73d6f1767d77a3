//! Graph - the top-level aggregate of projects, workspace and edges.
//!
//! The adjacency map is stored as ordered maps so two graphs built from the
//! same input compare and serialize identically. Traversal goes through a
//! petgraph view built on demand.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};

use petgraph::algo::{tarjan_scc, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Dfs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::project::Project;
use crate::core::scheme::{Scheme, TargetReference};
use crate::core::target::Target;
use crate::core::workspace::Workspace;
use crate::util::diagnostic::{suggestions, Diagnostic};

/// Identity of a target in the graph: owning project path plus name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GraphTarget {
    pub path: PathBuf,
    pub name: String,
}

impl GraphTarget {
    pub fn new(path: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        GraphTarget {
            path: path.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for GraphTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.path.display())
    }
}

impl From<&TargetReference> for GraphTarget {
    fn from(r: &TargetReference) -> Self {
        GraphTarget::new(r.project_path.clone(), r.name.clone())
    }
}

/// Adjacency map from a target to the targets it depends on.
pub type DependencyMap = BTreeMap<GraphTarget, BTreeSet<GraphTarget>>;

/// Error raised by graph validation and traversal.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("graph has {} unresolved reference(s)", issues.len())]
    Validation { issues: Vec<String> },

    #[error("cycle detected between targets")]
    Cycle { targets: Vec<String> },
}

impl GraphError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            GraphError::Validation { issues } => {
                let mut diag = Diagnostic::error(format!(
                    "graph has {} unresolved reference(s)",
                    issues.len()
                ));
                for issue in issues {
                    diag = diag.with_context(issue.clone());
                }
                diag.with_suggestion("Check target names in dependencies and schemes")
                    .with_suggestion(suggestions::UNRESOLVED_REFERENCE)
            }
            GraphError::Cycle { targets } => Diagnostic::error("cycle detected between targets")
                .with_context(format!("cycle: {}", targets.join(" -> ")))
                .with_suggestion("Break the cycle by removing or restructuring dependencies"),
        }
    }
}

/// The resolved build graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    pub name: String,
    pub path: PathBuf,
    pub workspace: Workspace,
    pub projects: BTreeMap<PathBuf, Project>,
    #[serde(with = "dependency_entries")]
    pub dependencies: DependencyMap,
}

/// Serializes the adjacency map as a list of entries, since JSON object
/// keys must be strings.
mod dependency_entries {
    use std::collections::BTreeSet;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::{DependencyMap, GraphTarget};

    #[derive(Serialize, Deserialize)]
    struct Entry {
        target: GraphTarget,
        #[serde(default)]
        dependencies: BTreeSet<GraphTarget>,
    }

    pub fn serialize<S: Serializer>(map: &DependencyMap, serializer: S) -> Result<S::Ok, S::Error> {
        let entries: Vec<Entry> = map
            .iter()
            .map(|(target, deps)| Entry {
                target: target.clone(),
                dependencies: deps.clone(),
            })
            .collect();
        entries.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DependencyMap, D::Error> {
        let entries = Vec::<Entry>::deserialize(deserializer)?;
        Ok(entries
            .into_iter()
            .map(|e| (e.target, e.dependencies))
            .collect())
    }
}

impl Graph {
    /// Look up a project by path.
    pub fn project(&self, path: &Path) -> Option<&Project> {
        self.projects.get(path)
    }

    /// Look up a target by identity.
    pub fn target(&self, id: &GraphTarget) -> Option<&Target> {
        self.projects.get(&id.path).and_then(|p| p.target(&id.name))
    }

    /// Check if a target exists.
    pub fn contains(&self, id: &GraphTarget) -> bool {
        self.target(id).is_some()
    }

    /// Every target in the graph, in project-path then declaration order.
    pub fn all_targets(&self) -> Vec<GraphTarget> {
        self.projects
            .values()
            .flat_map(|p| p.targets.iter().map(|t| GraphTarget::new(&p.path, &t.name)))
            .collect()
    }

    /// Direct dependencies of a target.
    pub fn direct_dependencies(&self, id: &GraphTarget) -> Vec<&GraphTarget> {
        self.dependencies
            .get(id)
            .map(|deps| deps.iter().collect())
            .unwrap_or_default()
    }

    /// Check that every edge and every scheme reference resolves.
    pub fn validate(&self) -> Result<(), GraphError> {
        let mut issues = Vec::new();

        for (from, deps) in &self.dependencies {
            if !self.contains(from) {
                issues.push(format!("dependency source `{}` does not exist", from));
            }
            for to in deps {
                if !self.contains(to) {
                    issues.push(format!("`{}` depends on missing target `{}`", from, to));
                }
            }
        }

        for project in self.projects.values() {
            for scheme in &project.schemes {
                self.check_scheme(scheme, &mut issues);
            }
        }
        for scheme in &self.workspace.schemes {
            self.check_scheme(scheme, &mut issues);
        }

        for path in &self.workspace.projects {
            if !self.projects.contains_key(path) {
                issues.push(format!(
                    "workspace references missing project {}",
                    path.display()
                ));
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(GraphError::Validation { issues })
        }
    }

    fn check_scheme(&self, scheme: &Scheme, issues: &mut Vec<String>) {
        for reference in scheme.target_references() {
            if !self.contains(&GraphTarget::from(reference)) {
                issues.push(format!(
                    "scheme `{}` references missing target `{}`",
                    scheme.name, reference
                ));
            }
        }
    }

    /// Build a petgraph view. Edges point from dependent to dependency.
    fn digraph(&self) -> (DiGraph<GraphTarget, ()>, HashMap<GraphTarget, NodeIndex>) {
        let mut graph = DiGraph::new();
        let mut nodes = HashMap::new();

        for id in self.all_targets() {
            let node = graph.add_node(id.clone());
            nodes.insert(id, node);
        }

        for (from, deps) in &self.dependencies {
            let Some(&from_node) = nodes.get(from) else {
                continue;
            };
            for to in deps {
                if let Some(&to_node) = nodes.get(to) {
                    graph.add_edge(from_node, to_node, ());
                }
            }
        }

        (graph, nodes)
    }

    /// Targets ordered so that dependencies come before their dependents.
    pub fn topological_order(&self) -> Result<Vec<GraphTarget>, GraphError> {
        let (graph, _) = self.digraph();

        match toposort(&graph, None) {
            Ok(order) => Ok(order.into_iter().rev().map(|n| graph[n].clone()).collect()),
            Err(_) => {
                let cycle = tarjan_scc(&graph)
                    .into_iter()
                    .find(|scc| {
                        scc.len() > 1 || graph.contains_edge(scc[0], scc[0])
                    })
                    .unwrap_or_default();
                let mut targets: Vec<String> =
                    cycle.iter().map(|n| graph[*n].name.clone()).collect();
                targets.sort();
                Err(GraphError::Cycle { targets })
            }
        }
    }

    /// Every target reachable from `id`, excluding `id` itself.
    pub fn transitive_dependencies(&self, id: &GraphTarget) -> BTreeSet<GraphTarget> {
        let (graph, nodes) = self.digraph();
        let mut result = BTreeSet::new();

        let Some(&start) = nodes.get(id) else {
            return result;
        };

        let mut dfs = Dfs::new(&graph, start);
        while let Some(node) = dfs.next(&graph) {
            if node != start {
                result.insert(graph[node].clone());
            }
        }
        result
    }
}
