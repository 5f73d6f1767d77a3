//! Schemes - named build/test/run configurations.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::target::LaunchArgument;

/// Reference to a target in a specific project.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TargetReference {
    pub project_path: PathBuf,
    pub name: String,
}

impl TargetReference {
    pub fn new(project_path: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        TargetReference {
            project_path: project_path.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for TargetReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.project_path.display())
    }
}

/// Environment variables and launch arguments for an action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arguments {
    #[serde(default)]
    pub environment: BTreeMap<String, String>,
    #[serde(default)]
    pub launch_arguments: Vec<LaunchArgument>,
}

impl Arguments {
    pub fn is_empty(&self) -> bool {
        self.environment.is_empty() && self.launch_arguments.is_empty()
    }
}

/// Targets built by a scheme.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildAction {
    pub targets: Vec<TargetReference>,
}

/// A test target within a test action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestableTarget {
    pub target: TargetReference,
    #[serde(default)]
    pub skipped: bool,
    #[serde(default)]
    pub parallelizable: bool,
    #[serde(default)]
    pub random_execution_ordering: bool,
}

/// Test configuration of a scheme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestAction {
    pub targets: Vec<TestableTarget>,
    #[serde(default)]
    pub arguments: Option<Arguments>,
    pub configuration: String,
    #[serde(default)]
    pub coverage: bool,
    #[serde(default)]
    pub code_coverage_targets: Vec<TargetReference>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
}

/// Runtime diagnostics a run action enables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticsOption {
    MainThreadChecker,
    PerformanceAntipatternChecker,
}

/// Run configuration of a scheme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunAction {
    pub configuration: String,
    #[serde(default)]
    pub executable: Option<TargetReference>,
    #[serde(default)]
    pub file_path: Option<PathBuf>,
    #[serde(default)]
    pub arguments: Option<Arguments>,
    #[serde(default)]
    pub diagnostics: BTreeSet<DiagnosticsOption>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
}

/// A named bundle of build/test/run configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scheme {
    pub name: String,
    #[serde(default = "default_shared")]
    pub shared: bool,
    #[serde(default)]
    pub build_action: Option<BuildAction>,
    #[serde(default)]
    pub test_action: Option<TestAction>,
    #[serde(default)]
    pub run_action: Option<RunAction>,
}

fn default_shared() -> bool {
    true
}

impl Scheme {
    /// A shared scheme that only builds the given targets.
    pub fn build_only(name: impl Into<String>, targets: Vec<TargetReference>) -> Self {
        Scheme {
            name: name.into(),
            shared: true,
            build_action: Some(BuildAction { targets }),
            test_action: None,
            run_action: None,
        }
    }

    /// Every target reference the scheme mentions, in action order.
    pub fn target_references(&self) -> Vec<&TargetReference> {
        let mut refs = Vec::new();
        if let Some(build) = &self.build_action {
            refs.extend(build.targets.iter());
        }
        if let Some(test) = &self.test_action {
            refs.extend(test.targets.iter().map(|t| &t.target));
            refs.extend(test.code_coverage_targets.iter());
        }
        if let Some(run) = &self.run_action {
            refs.extend(run.executable.iter());
        }
        refs
    }

    /// Check whether the scheme references a target in `project_path`.
    pub fn references_project(&self, project_path: &Path) -> bool {
        self.target_references()
            .iter()
            .any(|r| r.project_path == project_path)
    }
}
