//! The workspace umbrella scheme.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use crate::core::graph::Graph;
use crate::core::project::{Project, TestingOptions, DEFAULT_DEBUG_CONFIGURATION};
use crate::core::scheme::{BuildAction, Scheme, TargetReference, TestAction, TestableTarget};
use crate::core::target::Platform;
use crate::core::workspace::{AutogeneratedWorkspaceSchemes, CodeCoverageMode, Workspace};

/// Builds the `<workspace>-Workspace` scheme covering every project.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkspaceSchemeSynthesizer {
    force: bool,
}

impl WorkspaceSchemeSynthesizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate the scheme even when the workspace options disable it.
    pub fn forced() -> Self {
        WorkspaceSchemeSynthesizer { force: true }
    }

    /// The umbrella scheme, if one should exist.
    ///
    /// Requires generation to be enabled and at least one project. Targets
    /// are gathered from every workspace project whose platforms intersect
    /// the workspace's platforms. There is no run action.
    pub fn synthesize(
        &self,
        workspace: &Workspace,
        projects: &BTreeMap<PathBuf, Project>,
    ) -> Option<Scheme> {
        let (coverage_mode, testing, language, region) =
            match &workspace.generation_options.autogenerated_schemes {
                AutogeneratedWorkspaceSchemes::Enabled {
                    code_coverage,
                    testing,
                    test_language,
                    test_region,
                } => (
                    code_coverage.clone(),
                    *testing,
                    test_language.clone(),
                    test_region.clone(),
                ),
                AutogeneratedWorkspaceSchemes::Disabled if self.force => (
                    CodeCoverageMode::Disabled,
                    TestingOptions::default(),
                    None,
                    None,
                ),
                AutogeneratedWorkspaceSchemes::Disabled => return None,
            };

        let members: Vec<&Project> = workspace
            .projects
            .iter()
            .filter_map(|path| projects.get(path))
            .collect();
        if members.is_empty() {
            return None;
        }

        let platforms: BTreeSet<Platform> = members
            .iter()
            .flat_map(|p| p.targets.iter())
            .flat_map(|t| t.platforms.iter().copied())
            .collect();

        let mut build = BTreeSet::new();
        let mut tests = BTreeSet::new();
        for project in &members {
            for target in &project.targets {
                if target.platforms.is_disjoint(&platforms) {
                    continue;
                }
                let reference = TargetReference::new(&project.path, &target.name);
                if target.product.is_test_bundle() {
                    tests.insert(reference);
                } else {
                    build.insert(reference);
                }
            }
        }

        let (coverage, code_coverage_targets) = match coverage_mode {
            CodeCoverageMode::All => (true, Vec::new()),
            CodeCoverageMode::Disabled => (false, Vec::new()),
            CodeCoverageMode::Targets(targets) => (!targets.is_empty(), targets),
            CodeCoverageMode::Relevant => {
                let relevant = relevant_coverage_targets(&members);
                (!relevant.is_empty(), relevant)
            }
        };

        let name = workspace.umbrella_scheme_name();
        tracing::debug!(
            "workspace scheme `{}`: {} build, {} test, coverage {}",
            name,
            build.len(),
            tests.len(),
            coverage
        );

        let build_targets: Vec<TargetReference> = if build.is_empty() {
            tests.iter().cloned().collect()
        } else {
            build.into_iter().collect()
        };

        let test_action = (!tests.is_empty()).then(|| TestAction {
            targets: tests
                .into_iter()
                .map(|target| TestableTarget {
                    target,
                    skipped: false,
                    parallelizable: testing.parallelizable,
                    random_execution_ordering: testing.random_execution_ordering,
                })
                .collect(),
            arguments: None,
            configuration: DEFAULT_DEBUG_CONFIGURATION.to_string(),
            coverage,
            code_coverage_targets,
            language,
            region,
        });

        Some(Scheme {
            name,
            shared: true,
            build_action: Some(BuildAction {
                targets: build_targets,
            }),
            test_action,
            run_action: None,
        })
    }

    /// Add the umbrella scheme to the graph's workspace.
    ///
    /// A user-defined workspace scheme with the same name is kept instead.
    pub fn apply(&self, graph: &mut Graph) {
        let Some(scheme) = self.synthesize(&graph.workspace, &graph.projects) else {
            return;
        };
        if graph.workspace.schemes.iter().any(|s| s.name == scheme.name) {
            tracing::debug!("workspace already defines `{}`", scheme.name);
            return;
        }
        graph.workspace.schemes.push(scheme);
    }
}

/// Coverage targets the projects' own schemes already gather.
fn relevant_coverage_targets(projects: &[&Project]) -> Vec<TargetReference> {
    let targets: BTreeSet<TargetReference> = projects
        .iter()
        .flat_map(|p| p.schemes.iter())
        .filter_map(|s| s.test_action.as_ref())
        .filter(|t| t.coverage)
        .flat_map(|t| t.code_coverage_targets.iter().cloned())
        .collect();
    targets.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::project::AutomaticSchemes;
    use crate::core::target::{Product, Target};
    use crate::core::workspace::GenerationOptions;
    use crate::mapper::schemes::ProjectSchemeSynthesizer;

    fn app_project(name: &str) -> Project {
        Project::new(name, format!("/work/{}", name)).with_targets(vec![
            Target::new(name, Product::App).with_platforms([Platform::Ios]),
            Target::new(format!("{}Tests", name), Product::UnitTests)
                .with_platforms([Platform::Ios]),
        ])
    }

    fn workspace_with(mode: CodeCoverageMode, projects: &[&Project]) -> Workspace {
        Workspace::new("Shop", "/work")
            .with_projects(projects.iter().map(|p| p.path.clone()))
            .with_generation_options(GenerationOptions {
                autogenerated_schemes: AutogeneratedWorkspaceSchemes::Enabled {
                    code_coverage: mode,
                    testing: TestingOptions::default(),
                    test_language: None,
                    test_region: None,
                },
            })
    }

    fn project_map(projects: Vec<Project>) -> BTreeMap<PathBuf, Project> {
        projects.into_iter().map(|p| (p.path.clone(), p)).collect()
    }

    fn coverage_of(scheme: &Scheme) -> bool {
        scheme.test_action.as_ref().map(|t| t.coverage).unwrap_or(false)
    }

    #[test]
    fn test_umbrella_scheme_spans_projects() {
        let a = app_project("A");
        let b = app_project("B");
        let workspace = workspace_with(CodeCoverageMode::Disabled, &[&a, &b]);
        let scheme = WorkspaceSchemeSynthesizer::new()
            .synthesize(&workspace, &project_map(vec![a, b]))
            .unwrap();

        assert_eq!(scheme.name, "Shop-Workspace");
        let build: Vec<_> = scheme
            .build_action
            .as_ref()
            .unwrap()
            .targets
            .iter()
            .map(|t| t.name.as_str())
            .collect();
        assert_eq!(build, vec!["A", "B"]);

        let tests: Vec<_> = scheme
            .test_action
            .as_ref()
            .unwrap()
            .targets
            .iter()
            .map(|t| t.target.name.as_str())
            .collect();
        assert_eq!(tests, vec!["ATests", "BTests"]);
        assert!(scheme.run_action.is_none());
        assert!(!coverage_of(&scheme));
    }

    #[test]
    fn test_coverage_modes() {
        let a = app_project("A");
        let b = app_project("B");
        let projects = project_map(vec![a.clone(), b.clone()]);
        let synth = WorkspaceSchemeSynthesizer::new();

        let all = synth
            .synthesize(&workspace_with(CodeCoverageMode::All, &[&a, &b]), &projects)
            .unwrap();
        assert!(coverage_of(&all));

        let none = synth
            .synthesize(&workspace_with(CodeCoverageMode::Targets(vec![]), &[&a, &b]), &projects)
            .unwrap();
        assert!(!coverage_of(&none));

        let explicit = vec![TargetReference::new("/work/A", "A")];
        let some = synth
            .synthesize(
                &workspace_with(CodeCoverageMode::Targets(explicit.clone()), &[&a, &b]),
                &projects,
            )
            .unwrap();
        assert!(coverage_of(&some));
        assert_eq!(some.test_action.unwrap().code_coverage_targets, explicit);

        let relevant = synth
            .synthesize(&workspace_with(CodeCoverageMode::Relevant, &[&a, &b]), &projects)
            .unwrap();
        assert!(!coverage_of(&relevant));
    }

    #[test]
    fn test_relevant_coverage_from_project_schemes() {
        let with_coverage = app_project("A").with_automatic_schemes(AutomaticSchemes::Enabled {
            grouping: Default::default(),
            code_coverage: true,
            testing: TestingOptions::default(),
            run_language: None,
            run_region: None,
            test_language: None,
            test_region: None,
        });
        let mut kit = Project::new("Kit", "/work/Kit").with_targets(vec![
            Target::new("Kit", Product::Framework).with_platforms([Platform::Ios]),
            Target::new("KitTests", Product::UnitTests).with_platforms([Platform::Ios]),
        ]);
        kit.options = with_coverage.options.clone();

        let synth = ProjectSchemeSynthesizer::new();
        let a = synth.apply(with_coverage);
        let kit = synth.apply(kit);

        let workspace = workspace_with(CodeCoverageMode::Relevant, &[&a, &kit]);
        let scheme = WorkspaceSchemeSynthesizer::new()
            .synthesize(&workspace, &project_map(vec![a, kit]))
            .unwrap();

        assert!(coverage_of(&scheme));
        assert_eq!(
            scheme.test_action.unwrap().code_coverage_targets,
            vec![TargetReference::new("/work/Kit", "Kit")]
        );
    }

    #[test]
    fn test_disabled_unless_forced() {
        let a = app_project("A");
        let workspace = Workspace::new("Shop", "/work").with_projects([a.path.clone()]);
        let projects = project_map(vec![a]);

        assert!(WorkspaceSchemeSynthesizer::new()
            .synthesize(&workspace, &projects)
            .is_none());
        assert!(WorkspaceSchemeSynthesizer::forced()
            .synthesize(&workspace, &projects)
            .is_some());
    }

    #[test]
    fn test_no_projects_no_scheme() {
        let workspace = workspace_with(CodeCoverageMode::All, &[]);
        assert!(WorkspaceSchemeSynthesizer::forced()
            .synthesize(&workspace, &BTreeMap::new())
            .is_none());
    }

    #[test]
    fn test_platformless_targets_excluded() {
        let mut a = app_project("A");
        a.targets.push(Target::new("Scripts", Product::Bundle));
        let workspace = workspace_with(CodeCoverageMode::Disabled, &[&a]);

        let scheme = WorkspaceSchemeSynthesizer::new()
            .synthesize(&workspace, &project_map(vec![a]))
            .unwrap();
        assert!(scheme
            .target_references()
            .iter()
            .all(|r| r.name != "Scripts"));
    }

    #[test]
    fn test_user_defined_workspace_scheme_wins() {
        let a = app_project("A");
        let mut workspace = workspace_with(CodeCoverageMode::All, &[&a]);
        let user = Scheme::build_only("Shop-Workspace", vec![TargetReference::new("/work/A", "A")]);
        workspace.schemes.push(user.clone());

        let mut graph = Graph {
            name: "Shop".into(),
            path: "/work".into(),
            workspace,
            projects: project_map(vec![a]),
            dependencies: Default::default(),
        };
        WorkspaceSchemeSynthesizer::new().apply(&mut graph);

        assert_eq!(graph.workspace.schemes, vec![user]);
    }
}
