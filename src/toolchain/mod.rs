//! Toolchain queries.
//!
//! The mappers need three facts from the active toolchain: the language
//! version, the package tools version of a package manifest, and where the
//! toolchain is installed. They are modeled as a [`Toolchain`] capability
//! so mapping stays independent of the machine it runs on.

pub mod detect;

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::util::diagnostic::{suggestions, Diagnostic};
use crate::util::process::{find_executable, ProcessBuilder};

pub use detect::{parse_language_version, parse_tools_version};

/// Environment variable overriding the toolchain location.
pub const TOOLCHAIN_ENV: &str = "KEEL_TOOLCHAIN";

/// Error raised when the toolchain cannot answer a query.
#[derive(Debug, Error)]
pub enum ToolchainError {
    #[error("no active toolchain found")]
    NotFound,

    #[error("could not determine {what} from `{output}`")]
    UnreadableVersion { what: &'static str, output: String },

    #[error("toolchain command failed: {message}")]
    Command { message: String },
}

impl ToolchainError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ToolchainError::NotFound => Diagnostic::error("no active toolchain found")
                .with_context(format!("`swift` is not in PATH and {} is not set", TOOLCHAIN_ENV))
                .with_suggestion(suggestions::NO_TOOLCHAIN),
            ToolchainError::UnreadableVersion { what, output } => {
                Diagnostic::error(format!("could not determine {}", what))
                    .with_context(format!("toolchain printed: {}", output))
            }
            ToolchainError::Command { message } => {
                Diagnostic::error("toolchain command failed").with_context(message.clone())
            }
        }
    }
}

/// Facts about the active toolchain.
pub trait Toolchain: Send + Sync {
    /// Language version the toolchain compiles, e.g. `5.9`.
    fn language_version(&self) -> Result<String, ToolchainError>;

    /// Tools version declared by the package manifest in `package_dir`.
    fn tool_version(&self, package_dir: &Path) -> Result<String, ToolchainError>;

    /// Root directory of the active toolchain.
    fn active_toolchain_path(&self) -> Result<PathBuf, ToolchainError>;
}

/// [`Toolchain`] answered by running the installed `swift` driver.
#[derive(Debug, Clone, Default)]
pub struct SystemToolchain {
    root: Option<PathBuf>,
}

impl SystemToolchain {
    /// Locate the toolchain from `KEEL_TOOLCHAIN` or PATH.
    pub fn new() -> Self {
        SystemToolchain {
            root: std::env::var_os(TOOLCHAIN_ENV).map(PathBuf::from),
        }
    }

    /// Use an explicit toolchain root.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        SystemToolchain {
            root: Some(root.into()),
        }
    }

    fn driver(&self) -> Result<PathBuf, ToolchainError> {
        if let Some(root) = &self.root {
            let driver = root.join("usr").join("bin").join("swift");
            if driver.exists() {
                return Ok(driver);
            }
            tracing::debug!("{} has no swift driver, falling back to PATH", root.display());
        }
        find_executable("swift").ok_or(ToolchainError::NotFound)
    }

    fn run(&self, builder: ProcessBuilder) -> Result<String, ToolchainError> {
        builder.read_stdout().map_err(|e| ToolchainError::Command {
            message: format!("{:#}", e),
        })
    }
}

impl Toolchain for SystemToolchain {
    fn language_version(&self) -> Result<String, ToolchainError> {
        let output = self.run(ProcessBuilder::new(self.driver()?).arg("--version"))?;
        parse_language_version(&output).ok_or(ToolchainError::UnreadableVersion {
            what: "the language version",
            output,
        })
    }

    fn tool_version(&self, package_dir: &Path) -> Result<String, ToolchainError> {
        let output = self.run(
            ProcessBuilder::new(self.driver()?)
                .args(["package", "tools-version"])
                .cwd(package_dir),
        )?;
        parse_tools_version(&output)
            .map(|v| v.to_string())
            .ok_or(ToolchainError::UnreadableVersion {
                what: "the package tools version",
                output,
            })
    }

    fn active_toolchain_path(&self) -> Result<PathBuf, ToolchainError> {
        if let Some(root) = &self.root {
            return Ok(root.clone());
        }
        let driver = self.driver()?;
        let driver = driver.canonicalize().unwrap_or(driver);
        detect::toolchain_root(&driver).ok_or(ToolchainError::NotFound)
    }
}
