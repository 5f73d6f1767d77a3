//! Projects and their scheme generation options.

use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::core::scheme::Scheme;
use crate::core::settings::SettingsDictionary;
use crate::core::target::Target;

/// Name of the default debug build configuration.
pub const DEFAULT_DEBUG_CONFIGURATION: &str = "Debug";

/// Testing flags applied to generated test actions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestingOptions {
    pub parallelizable: bool,
    pub random_execution_ordering: bool,
}

/// How targets are grouped into automatically generated schemes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum SchemeGrouping {
    /// One scheme named after the project, containing every target
    SingleScheme,
    /// Group targets whose names share a stem once a role suffix is removed
    ByNameSuffix {
        #[serde(default)]
        build: BTreeSet<String>,
        #[serde(default)]
        test: BTreeSet<String>,
        #[serde(default)]
        run: BTreeSet<String>,
    },
    /// One scheme per target
    NotGrouped,
}

/// Conventional suffixes of build-only targets.
pub const DEFAULT_BUILD_SUFFIXES: &[&str] = &["Implementation", "Interface", "Mocks", "Testing"];

/// Conventional suffixes of test targets.
pub const DEFAULT_TEST_SUFFIXES: &[&str] = &["Tests", "IntegrationTests", "UITests", "SnapshotTests"];

/// Conventional suffixes of runnable targets.
pub const DEFAULT_RUN_SUFFIXES: &[&str] = &["App", "Demo", "Example"];

/// Collect string slices into a suffix set.
pub fn suffix_set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl SchemeGrouping {
    /// Suffix grouping with the conventional suffix sets.
    pub fn default_suffixes() -> Self {
        SchemeGrouping::ByNameSuffix {
            build: suffix_set(DEFAULT_BUILD_SUFFIXES),
            test: suffix_set(DEFAULT_TEST_SUFFIXES),
            run: suffix_set(DEFAULT_RUN_SUFFIXES),
        }
    }
}

impl Default for SchemeGrouping {
    fn default() -> Self {
        SchemeGrouping::default_suffixes()
    }
}

/// Automatic scheme generation for a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum AutomaticSchemes {
    Disabled,
    Enabled {
        #[serde(default)]
        grouping: SchemeGrouping,
        #[serde(default)]
        code_coverage: bool,
        #[serde(default)]
        testing: TestingOptions,
        #[serde(default)]
        run_language: Option<String>,
        #[serde(default)]
        run_region: Option<String>,
        #[serde(default)]
        test_language: Option<String>,
        #[serde(default)]
        test_region: Option<String>,
    },
}

impl AutomaticSchemes {
    /// Enabled with the given grouping and every other option at its default.
    pub fn enabled(grouping: SchemeGrouping) -> Self {
        AutomaticSchemes::Enabled {
            grouping,
            code_coverage: false,
            testing: TestingOptions::default(),
            run_language: None,
            run_region: None,
            test_language: None,
            test_region: None,
        }
    }
}

impl Default for AutomaticSchemes {
    fn default() -> Self {
        AutomaticSchemes::enabled(SchemeGrouping::default())
    }
}

/// Project-level options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectOptions {
    pub automatic_schemes: AutomaticSchemes,
}

/// A named collection of targets sharing settings and file organization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Directory the project file is generated in (identity)
    pub path: PathBuf,

    /// Directory source paths are relative to
    #[serde(default)]
    pub source_root: PathBuf,

    pub name: String,

    #[serde(default)]
    pub targets: Vec<Target>,

    #[serde(default)]
    pub settings: SettingsDictionary,

    #[serde(default)]
    pub schemes: Vec<Scheme>,

    /// Group the project's files are shown under
    #[serde(default)]
    pub files_group: Option<String>,

    #[serde(default)]
    pub options: ProjectOptions,

    #[serde(default = "default_configuration")]
    pub default_debug_configuration: String,

    #[serde(default)]
    pub additional_files: Vec<PathBuf>,
}

fn default_configuration() -> String {
    DEFAULT_DEBUG_CONFIGURATION.to_string()
}

impl Project {
    /// Create an empty project at `path`.
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Project {
            source_root: path.clone(),
            path,
            name: name.into(),
            targets: Vec::new(),
            settings: SettingsDictionary::new(),
            schemes: Vec::new(),
            files_group: None,
            options: ProjectOptions::default(),
            default_debug_configuration: default_configuration(),
            additional_files: Vec::new(),
        }
    }

    pub fn with_targets(mut self, targets: Vec<Target>) -> Self {
        self.targets = targets;
        self
    }

    pub fn with_schemes(mut self, schemes: Vec<Scheme>) -> Self {
        self.schemes = schemes;
        self
    }

    pub fn with_automatic_schemes(mut self, automatic: AutomaticSchemes) -> Self {
        self.options.automatic_schemes = automatic;
        self
    }

    pub fn with_source_root(mut self, source_root: impl Into<PathBuf>) -> Self {
        self.source_root = source_root.into();
        self
    }

    pub fn with_files_group(mut self, group: impl Into<String>) -> Self {
        self.files_group = Some(group.into());
        self
    }

    /// Look up a target by name.
    pub fn target(&self, name: &str) -> Option<&Target> {
        self.targets.iter().find(|t| t.name == name)
    }

    /// Check if the project contains a target with this name.
    pub fn contains_target(&self, name: &str) -> bool {
        self.target(name).is_some()
    }
}
