//! Resolution of by-name target dependencies into graph edges.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use crate::core::graph::{DependencyMap, GraphTarget};
use crate::core::project::Project;
use crate::core::target::{Target, TargetDependency};
use crate::util::fs::normalize_path;

/// Turns symbolic target dependencies into a cross-project adjacency map.
///
/// A dependency that names its project resolves there. Otherwise a name in
/// the override table resolves to the overriding project, and everything
/// else stays in the dependent target's own project. Package and SDK
/// dependencies never become edges.
#[derive(Debug, Clone, Default)]
pub struct GraphDependencyResolver {
    overrides: BTreeMap<String, PathBuf>,
}

impl GraphDependencyResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve dependencies named `name` to the project at `path`.
    pub fn with_override(mut self, name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.overrides.insert(name.into(), path.into());
        self
    }

    /// Resolve every target of `project` to the project's path.
    pub fn with_project_overrides(mut self, project: &Project) -> Self {
        for target in &project.targets {
            self.overrides
                .insert(target.name.clone(), project.path.clone());
        }
        self
    }

    /// Adjacency entries for `targets` owned by the project at `project_path`.
    ///
    /// Every target gets an entry, empty when it has no by-name dependencies.
    pub fn resolve(&self, project_path: &Path, targets: &[Target]) -> DependencyMap {
        targets
            .iter()
            .map(|target| {
                let edges: BTreeSet<GraphTarget> = target
                    .dependencies
                    .iter()
                    .filter_map(|dep| self.destination(project_path, dep))
                    .collect();
                (GraphTarget::new(project_path, &target.name), edges)
            })
            .collect()
    }

    /// Adjacency entries for every target of every project.
    pub fn resolve_projects<'a>(
        &self,
        projects: impl IntoIterator<Item = &'a Project>,
    ) -> DependencyMap {
        let mut map = DependencyMap::new();
        for project in projects {
            map.extend(self.resolve(&project.path, &project.targets));
        }
        map
    }

    fn destination(&self, project_path: &Path, dependency: &TargetDependency) -> Option<GraphTarget> {
        let TargetDependency::Target { name, project, .. } = dependency else {
            return None;
        };

        let path = match project {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => normalize_path(&project_path.join(path)),
            None => self
                .overrides
                .get(name)
                .cloned()
                .unwrap_or_else(|| project_path.to_path_buf()),
        };
        Some(GraphTarget::new(path, name))
    }
}
