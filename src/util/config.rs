//! Configuration file support for Keel.
//!
//! Keel reads two configuration files:
//! - Global: `~/.keel/config.toml` - User-wide defaults
//! - Project: `.keel/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::project::{
    suffix_set, AutomaticSchemes, SchemeGrouping, TestingOptions, DEFAULT_BUILD_SUFFIXES,
    DEFAULT_RUN_SUFFIXES, DEFAULT_TEST_SUFFIXES,
};
use crate::core::scheme::TargetReference;
use crate::core::workspace::{AutogeneratedWorkspaceSchemes, CodeCoverageMode, GenerationOptions};

/// Keel configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Manifest discovery settings
    pub editor: EditorConfig,

    /// Project scheme generation
    pub schemes: SchemesConfig,

    /// Workspace scheme generation
    pub workspace: WorkspaceConfig,
}

/// Where the editor finds manifests and support code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// File name of project manifests
    pub manifest_file: String,

    /// File name of plugin manifests
    pub plugin_manifest_file: String,

    /// File name of the configuration manifest, inside `support_dir`
    pub config_file: String,

    /// File name of the package manifest, inside `support_dir`
    pub package_manifest_file: String,

    /// Directory holding helpers, templates, resource synthesizers, stencils
    pub support_dir: String,

    /// Patterns matching compiled manifest sources
    pub source_patterns: Vec<String>,

    /// Patterns matching template resources and stencils
    pub stencil_patterns: Vec<String>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        EditorConfig {
            manifest_file: "Project.swift".to_string(),
            plugin_manifest_file: "Plugin.swift".to_string(),
            config_file: "Config.swift".to_string(),
            package_manifest_file: "Package.swift".to_string(),
            support_dir: "Keel".to_string(),
            source_patterns: vec!["**/*.swift".to_string()],
            stencil_patterns: vec!["**/*.stencil".to_string()],
        }
    }
}

/// The grouping policy names accepted in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupingKind {
    SingleScheme,
    ByNameSuffix,
    NotGrouped,
    Disabled,
}

impl FromStr for GroupingKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "single-scheme" | "single" => Ok(GroupingKind::SingleScheme),
            "by-name-suffix" | "suffix" => Ok(GroupingKind::ByNameSuffix),
            "not-grouped" | "none" => Ok(GroupingKind::NotGrouped),
            "disabled" | "off" => Ok(GroupingKind::Disabled),
            other => bail!(
                "unknown scheme grouping `{}`\n\
                 expected one of: single-scheme, by-name-suffix, not-grouped, disabled",
                other
            ),
        }
    }
}

/// Project scheme generation settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemesConfig {
    /// Grouping policy name
    pub grouping: Option<String>,

    /// Suffixes identifying build-only targets
    pub build_suffixes: Option<Vec<String>>,

    /// Suffixes identifying test targets
    pub test_suffixes: Option<Vec<String>>,

    /// Suffixes identifying runnable targets
    pub run_suffixes: Option<Vec<String>>,

    /// Gather code coverage in generated test actions
    pub code_coverage: Option<bool>,

    /// Run tests in parallel
    pub parallelizable: Option<bool>,

    /// Randomize test execution order
    pub random_execution_order: Option<bool>,

    pub run_language: Option<String>,
    pub run_region: Option<String>,
    pub test_language: Option<String>,
    pub test_region: Option<String>,
}

/// Workspace scheme generation settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceConfig {
    /// Generate the `<name>-Workspace` scheme
    pub autogenerated_schemes: Option<bool>,

    /// Coverage mode: all, relevant, targets, disabled
    pub code_coverage: Option<String>,

    /// Explicit coverage targets for the `targets` mode
    pub coverage_targets: Vec<TargetReference>,

    pub parallelizable: Option<bool>,
    pub random_execution_order: Option<bool>,
    pub test_language: Option<String>,
    pub test_region: Option<String>,
}

fn take<T>(target: &mut Option<T>, other: Option<T>) {
    if other.is_some() {
        *target = other;
    }
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    ///
    /// The editor section is replaced wholesale when it differs from the
    /// defaults, since its fields only make sense together.
    pub fn merge(&mut self, other: Config) {
        if other.editor != EditorConfig::default() {
            self.editor = other.editor;
        }

        let s = other.schemes;
        take(&mut self.schemes.grouping, s.grouping);
        take(&mut self.schemes.build_suffixes, s.build_suffixes);
        take(&mut self.schemes.test_suffixes, s.test_suffixes);
        take(&mut self.schemes.run_suffixes, s.run_suffixes);
        take(&mut self.schemes.code_coverage, s.code_coverage);
        take(&mut self.schemes.parallelizable, s.parallelizable);
        take(
            &mut self.schemes.random_execution_order,
            s.random_execution_order,
        );
        take(&mut self.schemes.run_language, s.run_language);
        take(&mut self.schemes.run_region, s.run_region);
        take(&mut self.schemes.test_language, s.test_language);
        take(&mut self.schemes.test_region, s.test_region);

        let w = other.workspace;
        take(
            &mut self.workspace.autogenerated_schemes,
            w.autogenerated_schemes,
        );
        take(&mut self.workspace.code_coverage, w.code_coverage);
        if !w.coverage_targets.is_empty() {
            self.workspace.coverage_targets = w.coverage_targets;
        }
        take(&mut self.workspace.parallelizable, w.parallelizable);
        take(
            &mut self.workspace.random_execution_order,
            w.random_execution_order,
        );
        take(&mut self.workspace.test_language, w.test_language);
        take(&mut self.workspace.test_region, w.test_region);
    }

    /// Project automatic scheme options described by this config.
    pub fn automatic_schemes(&self) -> Result<AutomaticSchemes> {
        let kind = match &self.schemes.grouping {
            Some(name) => name.parse()?,
            None => GroupingKind::ByNameSuffix,
        };

        let grouping = match kind {
            GroupingKind::Disabled => return Ok(AutomaticSchemes::Disabled),
            GroupingKind::SingleScheme => SchemeGrouping::SingleScheme,
            GroupingKind::NotGrouped => SchemeGrouping::NotGrouped,
            GroupingKind::ByNameSuffix => {
                let pick = |custom: &Option<Vec<String>>, fallback: &[&str]| -> BTreeSet<String> {
                    match custom {
                        Some(suffixes) => suffixes.iter().cloned().collect(),
                        None => suffix_set(fallback),
                    }
                };
                SchemeGrouping::ByNameSuffix {
                    build: pick(&self.schemes.build_suffixes, DEFAULT_BUILD_SUFFIXES),
                    test: pick(&self.schemes.test_suffixes, DEFAULT_TEST_SUFFIXES),
                    run: pick(&self.schemes.run_suffixes, DEFAULT_RUN_SUFFIXES),
                }
            }
        };

        Ok(AutomaticSchemes::Enabled {
            grouping,
            code_coverage: self.schemes.code_coverage.unwrap_or(false),
            testing: TestingOptions {
                parallelizable: self.schemes.parallelizable.unwrap_or(false),
                random_execution_ordering: self.schemes.random_execution_order.unwrap_or(false),
            },
            run_language: self.schemes.run_language.clone(),
            run_region: self.schemes.run_region.clone(),
            test_language: self.schemes.test_language.clone(),
            test_region: self.schemes.test_region.clone(),
        })
    }

    /// Workspace generation options described by this config.
    pub fn workspace_generation_options(&self) -> Result<GenerationOptions> {
        if !self.workspace.autogenerated_schemes.unwrap_or(false) {
            return Ok(GenerationOptions::default());
        }

        let code_coverage = match self.workspace.code_coverage.as_deref() {
            None | Some("disabled") => CodeCoverageMode::Disabled,
            Some("all") => CodeCoverageMode::All,
            Some("relevant") => CodeCoverageMode::Relevant,
            Some("targets") => CodeCoverageMode::Targets(self.workspace.coverage_targets.clone()),
            Some(other) => bail!(
                "unknown code coverage mode `{}`\n\
                 expected one of: all, relevant, targets, disabled",
                other
            ),
        };

        Ok(GenerationOptions {
            autogenerated_schemes: AutogeneratedWorkspaceSchemes::Enabled {
                code_coverage,
                testing: TestingOptions {
                    parallelizable: self.workspace.parallelizable.unwrap_or(false),
                    random_execution_ordering: self
                        .workspace
                        .random_execution_order
                        .unwrap_or(false),
                },
                test_language: self.workspace.test_language.clone(),
                test_region: self.workspace.test_region.clone(),
            },
        })
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.keel/config.toml)
/// 2. Global config (~/.keel/config.toml)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global) = global_path {
        if global.exists() {
            config.merge(Config::load_or_default(global));
        }
    }

    if project_path.exists() {
        config.merge(Config::load_or_default(project_path));
    }

    config
}

/// Get the global keel config directory (~/.keel).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".keel"))
}

/// Get the global config path (~/.keel/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (.keel/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".keel").join("config.toml")
}
