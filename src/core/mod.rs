//! Core data structures for Keel.
//!
//! This module contains the model produced by the mappers:
//! - Targets and their dependencies
//! - Projects, schemes and workspaces
//! - Build settings and their composition
//! - The graph tying them together

pub mod graph;
pub mod project;
pub mod scheme;
pub mod settings;
pub mod target;
pub mod workspace;

pub use graph::{DependencyMap, Graph, GraphError, GraphTarget};
pub use project::{AutomaticSchemes, Project, SchemeGrouping};
pub use scheme::{Scheme, TargetReference};
pub use settings::{SettingValue, SettingsDictionary};
pub use target::{Platform, Product, Target, TargetDependency};
pub use workspace::{CodeCoverageMode, Workspace};
