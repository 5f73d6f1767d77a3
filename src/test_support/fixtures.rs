//! Test fixtures for common test scenarios.
//!
//! Builders for projects and on-disk editor layouts used across the unit
//! tests.

use std::fs;
use std::path::{Path, PathBuf};

use crate::core::project::Project;
use crate::core::target::{Platform, Product, Target};

/// Path of the project built by [`project_with`].
pub const FIXTURE_PROJECT_PATH: &str = "/fixture";

/// A project named `Fixture` with one iOS target per `(name, product)`.
pub fn project_with(targets: &[(&str, Product)]) -> Project {
    Project::new("Fixture", FIXTURE_PROJECT_PATH).with_targets(
        targets
            .iter()
            .map(|(name, product)| Target::new(*name, *product).with_platforms([Platform::Ios]))
            .collect(),
    )
}

/// Fixture for an editable project tree on disk.
#[derive(Debug, Clone, Default)]
pub struct EditorFixture {
    /// Directories holding a `Project.swift`, relative to the root
    pub manifests: Vec<PathBuf>,
    /// Helper files, relative to `Keel/ProjectDescriptionHelpers`
    pub helpers: Vec<PathBuf>,
    pub with_config: bool,
    pub with_package: bool,
}

impl EditorFixture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn manifest(mut self, dir: impl Into<PathBuf>) -> Self {
        self.manifests.push(dir.into());
        self
    }

    pub fn helper(mut self, file: impl Into<PathBuf>) -> Self {
        self.helpers.push(file.into());
        self
    }

    pub fn config(mut self) -> Self {
        self.with_config = true;
        self
    }

    pub fn package(mut self) -> Self {
        self.with_package = true;
        self
    }

    /// Write the tree under `root`.
    pub fn write(&self, root: &Path) -> std::io::Result<()> {
        for dir in &self.manifests {
            write_file(&root.join(dir).join("Project.swift"), "let project = Project()\n")?;
        }
        let support = root.join("Keel");
        for helper in &self.helpers {
            write_file(
                &support.join("ProjectDescriptionHelpers").join(helper),
                "import ProjectDescription\n",
            )?;
        }
        if self.with_config {
            write_file(&support.join("Config.swift"), "let config = Config()\n")?;
        }
        if self.with_package {
            write_file(
                &support.join("Package.swift"),
                "// swift-tools-version: 5.9\nimport PackageDescription\n",
            )?;
        }
        Ok(())
    }
}

fn write_file(path: &Path, content: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)
}
