//! Synthesis of project schemes from scheme buckets.

use std::collections::{BTreeMap, BTreeSet};

use crate::core::project::{AutomaticSchemes, Project, TestingOptions};
use crate::core::scheme::{
    Arguments, BuildAction, DiagnosticsOption, RunAction, Scheme, TargetReference, TestAction,
    TestableTarget,
};
use crate::core::target::Target;

use super::grouping::{SchemeBucket, SchemeGrouper};

/// Options applied to every generated project scheme.
#[derive(Debug, Clone, Default)]
struct SchemeOptions {
    code_coverage: bool,
    testing: TestingOptions,
    run_language: Option<String>,
    run_region: Option<String>,
    test_language: Option<String>,
    test_region: Option<String>,
}

impl SchemeOptions {
    fn from_project(project: &Project) -> Option<Self> {
        match &project.options.automatic_schemes {
            AutomaticSchemes::Disabled => None,
            AutomaticSchemes::Enabled {
                code_coverage,
                testing,
                run_language,
                run_region,
                test_language,
                test_region,
                ..
            } => Some(SchemeOptions {
                code_coverage: *code_coverage,
                testing: *testing,
                run_language: run_language.clone(),
                run_region: run_region.clone(),
                test_language: test_language.clone(),
                test_region: test_region.clone(),
            }),
        }
    }
}

/// Builds complete schemes for a project's buckets and merges them with
/// the schemes the user defined.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectSchemeSynthesizer {
    grouper: SchemeGrouper,
}

impl ProjectSchemeSynthesizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The project's final scheme list.
    ///
    /// User-defined schemes are kept as they are. A generated scheme whose
    /// name is already taken is dropped. The result is sorted by name.
    pub fn synthesize(&self, project: &Project) -> Vec<Scheme> {
        let mut schemes = project.schemes.clone();

        if let Some(options) = SchemeOptions::from_project(project) {
            let mut taken: BTreeSet<String> = schemes.iter().map(|s| s.name.clone()).collect();

            for bucket in self.grouper.buckets(project) {
                if taken.contains(&bucket.name) {
                    tracing::debug!(
                        "`{}` already has a scheme named `{}`, skipping generated one",
                        project.name,
                        bucket.name
                    );
                    continue;
                }
                taken.insert(bucket.name.clone());
                schemes.push(scheme_for_bucket(project, &bucket, &options));
            }
        }

        schemes.sort_by(|a, b| a.name.cmp(&b.name));
        schemes
    }

    /// Replace the project's scheme list with [`synthesize`](Self::synthesize).
    pub fn apply(&self, mut project: Project) -> Project {
        project.schemes = self.synthesize(&project);
        project
    }
}

fn scheme_for_bucket(project: &Project, bucket: &SchemeBucket, options: &SchemeOptions) -> Scheme {
    let reference = |name: &str| TargetReference::new(&project.path, name);
    let run_target = run_target(project, bucket);

    let mut build: Vec<TargetReference> = bucket
        .build
        .iter()
        .chain(bucket.run.iter())
        .map(|n| reference(n))
        .collect();
    if let Some(run) = run_target {
        if !build.iter().any(|r| r.name == run.name) {
            build.push(reference(&run.name));
        }
    }

    let testables: Vec<TargetReference> = bucket.test.iter().map(|n| reference(n)).collect();
    if build.is_empty() {
        build = testables.clone();
    }

    let test_action = (!testables.is_empty()).then(|| {
        let test_targets: Vec<&Target> = bucket
            .test
            .iter()
            .filter_map(|n| project.target(n))
            .collect();

        TestAction {
            targets: testables
                .iter()
                .map(|target| TestableTarget {
                    target: target.clone(),
                    skipped: false,
                    parallelizable: options.testing.parallelizable,
                    random_execution_ordering: options.testing.random_execution_ordering,
                })
                .collect(),
            arguments: merged_arguments(&test_targets),
            configuration: project.default_debug_configuration.clone(),
            coverage: options.code_coverage,
            code_coverage_targets: if options.code_coverage {
                bucket.build.iter().map(|n| reference(n)).collect()
            } else {
                Vec::new()
            },
            language: options.test_language.clone(),
            region: options.test_region.clone(),
        }
    });

    let run_action = run_target.map(|run| RunAction {
        configuration: project.default_debug_configuration.clone(),
        executable: Some(reference(&run.name)),
        file_path: None,
        arguments: merged_arguments(&[run]),
        diagnostics: BTreeSet::from([DiagnosticsOption::MainThreadChecker]),
        language: options.run_language.clone(),
        region: options.run_region.clone(),
    });

    tracing::debug!(
        "scheme `{}`: {} build, {} test, run {:?}",
        bucket.name,
        build.len(),
        testables.len(),
        run_target.map(|t| t.name.as_str())
    );

    Scheme {
        name: bucket.name.clone(),
        shared: true,
        build_action: Some(BuildAction { targets: build }),
        test_action,
        run_action,
    }
}

/// The target a bucket's run action launches.
///
/// A single run target is used directly. Otherwise an extension among the
/// build targets is launched through its host app: a target that can host
/// it and depends on it, first by name.
fn run_target<'p>(project: &'p Project, bucket: &SchemeBucket) -> Option<&'p Target> {
    if bucket.run.len() == 1 {
        return bucket.run.iter().next().and_then(|n| project.target(n));
    }

    bucket
        .build
        .iter()
        .filter_map(|n| project.target(n))
        .filter(|t| t.product.is_extension())
        .find_map(|extension| host_of(project, &extension.name))
}

fn host_of<'p>(project: &'p Project, extension: &str) -> Option<&'p Target> {
    project
        .targets
        .iter()
        .filter(|t| t.product.can_host_tests() && t.depends_on(extension))
        .min_by(|a, b| a.name.cmp(&b.name))
}

/// Environment and launch arguments of several targets.
///
/// The earliest target wins an environment key, and launch arguments keep
/// their first occurrence by name.
fn merged_arguments(targets: &[&Target]) -> Option<Arguments> {
    let mut environment = BTreeMap::new();
    let mut launch_arguments = Vec::new();
    let mut seen = BTreeSet::new();

    for target in targets {
        for (key, value) in &target.environment {
            environment
                .entry(key.clone())
                .or_insert_with(|| value.clone());
        }
        for argument in &target.launch_arguments {
            if seen.insert(argument.name.clone()) {
                launch_arguments.push(argument.clone());
            }
        }
    }

    let arguments = Arguments {
        environment,
        launch_arguments,
    };
    (!arguments.is_empty()).then_some(arguments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::project::SchemeGrouping;
    use crate::core::target::{LaunchArgument, Product, TargetDependency};
    use crate::test_support::project_with;

    fn scheme<'a>(schemes: &'a [Scheme], name: &str) -> &'a Scheme {
        schemes
            .iter()
            .find(|s| s.name == name)
            .unwrap_or_else(|| panic!("no scheme named {}", name))
    }

    fn build_names(scheme: &Scheme) -> Vec<&str> {
        scheme
            .build_action
            .as_ref()
            .map(|b| b.targets.iter().map(|t| t.name.as_str()).collect())
            .unwrap_or_default()
    }

    #[test]
    fn test_app_scheme_has_build_test_and_run() {
        let project = project_with(&[("App", Product::App), ("AppTests", Product::UnitTests)]);
        let schemes = ProjectSchemeSynthesizer::new().synthesize(&project);

        assert_eq!(schemes.len(), 1);
        let app = &schemes[0];
        assert_eq!(app.name, "App");
        assert_eq!(build_names(app), vec!["App"]);

        let test = app.test_action.as_ref().unwrap();
        assert_eq!(test.targets.len(), 1);
        assert_eq!(test.targets[0].target.name, "AppTests");
        assert_eq!(test.configuration, "Debug");

        let run = app.run_action.as_ref().unwrap();
        assert_eq!(run.executable.as_ref().unwrap().name, "App");
        assert!(run.diagnostics.contains(&DiagnosticsOption::MainThreadChecker));
    }

    #[test]
    fn test_extension_bucket_runs_host_app() {
        let mut project = project_with(&[
            ("Widget", Product::AppExtension),
            ("Zapp", Product::App),
            ("Host", Product::App),
        ]);
        for name in ["Zapp", "Host"] {
            let target = project.targets.iter_mut().find(|t| t.name == name).unwrap();
            target.dependencies.push(TargetDependency::target("Widget"));
        }
        project = project.with_automatic_schemes(AutomaticSchemes::enabled(SchemeGrouping::NotGrouped));

        let schemes = ProjectSchemeSynthesizer::new().synthesize(&project);
        let widget = scheme(&schemes, "Widget");

        assert_eq!(
            widget.run_action.as_ref().unwrap().executable.as_ref().unwrap().name,
            "Host"
        );
        assert_eq!(build_names(widget), vec!["Widget", "Host"]);
    }

    #[test]
    fn test_build_order_is_build_then_run() {
        let project = project_with(&[
            ("FeatureDemo", Product::App),
            ("FeatureInterface", Product::Framework),
            ("Feature", Product::Framework),
        ]);
        let schemes = ProjectSchemeSynthesizer::new().synthesize(&project);

        assert_eq!(
            build_names(scheme(&schemes, "Feature")),
            vec!["Feature", "FeatureInterface", "FeatureDemo"]
        );
    }

    #[test]
    fn test_test_only_bucket_builds_testables() {
        let project = project_with(&[("LoneTests", Product::UnitTests)]);
        let schemes = ProjectSchemeSynthesizer::new().synthesize(&project);

        let lone = scheme(&schemes, "LoneTests");
        assert_eq!(build_names(lone), vec!["LoneTests"]);
        assert!(lone.run_action.is_none());
    }

    #[test]
    fn test_test_arguments_merge_first_wins() {
        let mut project = project_with(&[
            ("Kit", Product::Framework),
            ("KitTests", Product::UnitTests),
            ("KitUITests", Product::UiTests),
        ]);
        project.targets[1] = project.targets[1]
            .clone()
            .with_env("MODE", "unit")
            .with_launch_argument(LaunchArgument::new("-verbose"));
        project.targets[2] = project.targets[2]
            .clone()
            .with_env("MODE", "ui")
            .with_env("UI", "1")
            .with_launch_argument(LaunchArgument::new("-verbose"))
            .with_launch_argument(LaunchArgument::new("-ui"));

        let schemes = ProjectSchemeSynthesizer::new().synthesize(&project);
        let arguments = scheme(&schemes, "Kit")
            .test_action
            .as_ref()
            .and_then(|t| t.arguments.as_ref())
            .unwrap();

        assert_eq!(arguments.environment["MODE"], "unit");
        assert_eq!(arguments.environment["UI"], "1");
        let names: Vec<_> = arguments
            .launch_arguments
            .iter()
            .map(|a| a.name.as_str())
            .collect();
        assert_eq!(names, vec!["-verbose", "-ui"]);
    }

    #[test]
    fn test_user_scheme_wins_collision() {
        let user = Scheme::build_only("App", vec![TargetReference::new("/fixture", "App")]);
        let project = project_with(&[
            ("App", Product::App),
            ("AppTests", Product::UnitTests),
            ("Kit", Product::Framework),
        ])
        .with_schemes(vec![user.clone()]);

        let schemes = ProjectSchemeSynthesizer::new().synthesize(&project);

        assert_eq!(schemes.len(), 2);
        assert_eq!(scheme(&schemes, "App"), &user);
        let names: Vec<_> = schemes.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["App", "Kit"]);
    }

    #[test]
    fn test_not_grouped_one_scheme_per_target() {
        let project = project_with(&[
            ("App", Product::App),
            ("AppTests", Product::UnitTests),
            ("Kit", Product::Framework),
            ("Widget", Product::AppExtension),
        ])
        .with_automatic_schemes(AutomaticSchemes::enabled(SchemeGrouping::NotGrouped));

        let schemes = ProjectSchemeSynthesizer::new().synthesize(&project);
        let names: Vec<_> = schemes.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["App", "AppTests", "Kit", "Widget"]);
    }

    #[test]
    fn test_disabled_keeps_only_user_schemes() {
        let user = Scheme::build_only("Custom", vec![TargetReference::new("/fixture", "App")]);
        let project = project_with(&[("App", Product::App)])
            .with_schemes(vec![user])
            .with_automatic_schemes(AutomaticSchemes::Disabled);

        let schemes = ProjectSchemeSynthesizer::new().synthesize(&project);
        assert_eq!(schemes.len(), 1);
        assert_eq!(schemes[0].name, "Custom");
    }

    #[test]
    fn test_testing_options_and_coverage() {
        let project = project_with(&[
            ("Kit", Product::Framework),
            ("KitTests", Product::UnitTests),
        ])
        .with_automatic_schemes(AutomaticSchemes::Enabled {
            grouping: SchemeGrouping::default(),
            code_coverage: true,
            testing: TestingOptions {
                parallelizable: true,
                random_execution_ordering: true,
            },
            run_language: None,
            run_region: None,
            test_language: Some("fr".into()),
            test_region: Some("FR".into()),
        });

        let schemes = ProjectSchemeSynthesizer::new().synthesize(&project);
        let test = scheme(&schemes, "Kit").test_action.as_ref().unwrap();

        assert!(test.coverage);
        assert_eq!(test.code_coverage_targets, vec![TargetReference::new("/fixture", "Kit")]);
        assert!(test.targets[0].parallelizable);
        assert!(test.targets[0].random_execution_ordering);
        assert_eq!(test.language.as_deref(), Some("fr"));
        assert_eq!(test.region.as_deref(), Some("FR"));
    }

    #[test]
    fn test_apply_replaces_scheme_list() {
        let project = project_with(&[("App", Product::App)]);
        let project = ProjectSchemeSynthesizer::new().apply(project);
        assert_eq!(project.schemes.len(), 1);
        assert_eq!(project.schemes[0].name, "App");
    }
}
