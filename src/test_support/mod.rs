//! Test utilities and mocks for Keel unit tests.
//!
//! This module provides in-memory implementations of the [`Globber`] and
//! [`Toolchain`] capabilities so mappers can be tested without touching the
//! filesystem or running a toolchain.
//!
//! # Example
//!
//! ```rust,ignore
//! use keel::test_support::{MockGlobber, MockToolchain};
//!
//! #[test]
//! fn test_example() {
//!     let globber = MockGlobber::new().with_file("/plugins/A/Templates/T.stencil");
//!     let toolchain = MockToolchain::new().with_language_version("5.10");
//!
//!     let mapper = EditorGraphMapper::new(&globber, &toolchain);
//!     // ...
//! }
//! ```

pub mod fixtures;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{bail, Result};
use tracing_subscriber::fmt::MakeWriter;

use crate::toolchain::{Toolchain, ToolchainError};
use crate::util::fs::Globber;

// Re-export fixtures for convenience
pub use fixtures::*;

/// In-memory [`Globber`].
///
/// Directories exist when they contain a registered file. Globbing a
/// directory marked with [`failing_on`](MockGlobber::failing_on) fails.
#[derive(Debug, Clone, Default)]
pub struct MockGlobber {
    files: BTreeSet<PathBuf>,
    failing: BTreeSet<PathBuf>,
}

impl MockGlobber {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a file.
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.files.insert(path.into());
        self
    }

    /// Make globbing `directory` fail.
    pub fn failing_on(mut self, directory: impl Into<PathBuf>) -> Self {
        self.failing.insert(directory.into());
        self
    }
}

impl Globber for MockGlobber {
    fn exists(&self, path: &Path) -> bool {
        self.failing.iter().any(|d| d == path) || self.files.iter().any(|f| f.starts_with(path))
    }

    fn glob(&self, directory: &Path, patterns: &[String]) -> Result<Vec<PathBuf>> {
        if self.failing.contains(directory) {
            bail!("permission denied: {}", directory.display());
        }

        let compiled = patterns
            .iter()
            .map(|p| glob::Pattern::new(p))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(self
            .files
            .iter()
            .filter(|f| {
                f.strip_prefix(directory)
                    .map(|rel| compiled.iter().any(|p| p.matches_path(rel)))
                    .unwrap_or(false)
            })
            .cloned()
            .collect())
    }
}

/// Scripted [`Toolchain`].
///
/// Answers with fixed values and records every tools version request.
#[derive(Debug, Clone)]
pub struct MockToolchain {
    language_version: Option<String>,
    tool_version: Option<String>,
    toolchain_path: Option<PathBuf>,
    requests: Arc<Mutex<Vec<PathBuf>>>,
}

impl Default for MockToolchain {
    fn default() -> Self {
        MockToolchain {
            language_version: Some("5.9".to_string()),
            tool_version: Some("5.9.0".to_string()),
            toolchain_path: Some(PathBuf::from("/Toolchains/Default.xctoolchain")),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl MockToolchain {
    pub fn new() -> Self {
        Self::default()
    }

    /// A toolchain that answers nothing.
    pub fn unavailable() -> Self {
        MockToolchain {
            language_version: None,
            tool_version: None,
            toolchain_path: None,
            ..Default::default()
        }
    }

    pub fn with_language_version(mut self, version: impl Into<String>) -> Self {
        self.language_version = Some(version.into());
        self
    }

    pub fn with_tool_version(mut self, version: impl Into<String>) -> Self {
        self.tool_version = Some(version.into());
        self
    }

    pub fn without_tool_version(mut self) -> Self {
        self.tool_version = None;
        self
    }

    pub fn with_toolchain_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.toolchain_path = Some(path.into());
        self
    }

    /// Directories the tools version was requested for, in order.
    pub fn tool_version_requests(&self) -> Vec<PathBuf> {
        self.requests.lock().unwrap().clone()
    }
}

impl Toolchain for MockToolchain {
    fn language_version(&self) -> Result<String, ToolchainError> {
        self.language_version.clone().ok_or(ToolchainError::NotFound)
    }

    fn tool_version(&self, package_dir: &Path) -> Result<String, ToolchainError> {
        self.requests.lock().unwrap().push(package_dir.to_path_buf());
        self.tool_version
            .clone()
            .ok_or_else(|| ToolchainError::UnreadableVersion {
                what: "the package tools version",
                output: String::new(),
            })
    }

    fn active_toolchain_path(&self) -> Result<PathBuf, ToolchainError> {
        self.toolchain_path.clone().ok_or(ToolchainError::NotFound)
    }
}

/// Log sink shared between a test and the subscriber it installs.
#[derive(Debug, Clone, Default)]
pub struct LogCapture {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl LogCapture {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buffer.lock().unwrap()).into_owned()
    }
}

impl std::io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = LogCapture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Run `f` with warnings and errors recorded, returning its result and the
/// formatted log lines.
pub fn capture_logs<R>(f: impl FnOnce() -> R) -> (R, String) {
    let capture = LogCapture::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(capture.clone())
        .with_max_level(tracing::Level::WARN)
        .with_ansi(false)
        .with_target(false)
        .without_time()
        .finish();

    let result = tracing::subscriber::with_default(subscriber, f);
    (result, capture.contents())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_globber_matches_under_directory() {
        let globber = MockGlobber::new()
            .with_file("/p/Templates/a/A.swift")
            .with_file("/p/Templates/B.stencil")
            .with_file("/p/Other/C.swift");

        assert!(globber.exists(Path::new("/p/Templates")));
        assert!(!globber.exists(Path::new("/p/Missing")));

        let found = globber
            .glob(Path::new("/p/Templates"), &["**/*.swift".to_string()])
            .unwrap();
        assert_eq!(found, vec![PathBuf::from("/p/Templates/a/A.swift")]);
    }

    #[test]
    fn test_capture_logs_keeps_warnings_only() {
        let (value, logs) = capture_logs(|| {
            tracing::info!("mapping started");
            tracing::warn!("directory missing");
            7
        });

        assert_eq!(value, 7);
        assert!(logs.contains("WARN"));
        assert!(logs.contains("directory missing"));
        assert!(!logs.contains("mapping started"));
    }

    #[test]
    fn test_mock_globber_failure() {
        let globber = MockGlobber::new().failing_on("/p/Templates");
        assert!(globber.exists(Path::new("/p/Templates")));
        assert!(globber.glob(Path::new("/p/Templates"), &[]).is_err());
    }

    #[test]
    fn test_mock_toolchain_records_requests() {
        let toolchain = MockToolchain::new();
        toolchain.tool_version(Path::new("/a")).unwrap();
        toolchain.tool_version(Path::new("/b")).unwrap();
        assert_eq!(
            toolchain.tool_version_requests(),
            vec![PathBuf::from("/a"), PathBuf::from("/b")]
        );
        assert!(MockToolchain::unavailable().language_version().is_err());
    }
}
