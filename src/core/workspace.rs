//! Workspace - a collection of projects with workspace-level schemes.
//!
//! A Workspace references its projects by path; the projects themselves
//! live in the graph.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::core::project::TestingOptions;
use crate::core::scheme::{Scheme, TargetReference};

/// Suffix appended to the workspace name for the umbrella scheme.
pub const WORKSPACE_SCHEME_SUFFIX: &str = "-Workspace";

/// Which targets gather code coverage in the workspace scheme.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodeCoverageMode {
    /// Coverage for every target
    All,
    /// Coverage for targets the project schemes already cover
    Relevant,
    /// Coverage for an explicit list of targets
    Targets(Vec<TargetReference>),
    /// No coverage
    #[default]
    Disabled,
}

/// Automatic generation of the workspace umbrella scheme.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum AutogeneratedWorkspaceSchemes {
    #[default]
    Disabled,
    Enabled {
        #[serde(default)]
        code_coverage: CodeCoverageMode,
        #[serde(default)]
        testing: TestingOptions,
        #[serde(default)]
        test_language: Option<String>,
        #[serde(default)]
        test_region: Option<String>,
    },
}

/// Workspace generation options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationOptions {
    pub autogenerated_schemes: AutogeneratedWorkspaceSchemes,
}

/// A workspace referencing projects by path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workspace {
    pub name: String,

    /// Directory the workspace lives in
    pub path: PathBuf,

    /// Projects in the order they are shown
    #[serde(default)]
    pub projects: Vec<PathBuf>,

    #[serde(default)]
    pub generation_options: GenerationOptions,

    #[serde(default)]
    pub schemes: Vec<Scheme>,
}

impl Workspace {
    /// Create an empty workspace.
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Workspace {
            name: name.into(),
            path: path.into(),
            projects: Vec::new(),
            generation_options: GenerationOptions::default(),
            schemes: Vec::new(),
        }
    }

    /// Set the project paths.
    pub fn with_projects(mut self, projects: impl IntoIterator<Item = PathBuf>) -> Self {
        self.projects = projects.into_iter().collect();
        self
    }

    /// Set the generation options.
    pub fn with_generation_options(mut self, options: GenerationOptions) -> Self {
        self.generation_options = options;
        self
    }

    /// Name of the umbrella scheme.
    pub fn umbrella_scheme_name(&self) -> String {
        format!("{}{}", self.name, WORKSPACE_SCHEME_SUFFIX)
    }
}
