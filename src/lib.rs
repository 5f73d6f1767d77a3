//! Keel - project graphs and schemes from declarative project descriptions
//!
//! This crate provides the core library functionality for Keel: the
//! project/target/scheme model, the editor graph mapper, automatic scheme
//! synthesis and dependency resolution.

pub mod core;
pub mod mapper;
pub mod ops;
pub mod toolchain;
pub mod util;

/// Test utilities and mocks for Keel unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides in-memory globbing and a scripted toolchain.
#[cfg(test)]
pub mod test_support;

pub use core::{
    graph::Graph, project::Project, scheme::Scheme, target::Target, workspace::Workspace,
};
pub use mapper::{EditorGraphMapper, EditorInput, MapperError};
