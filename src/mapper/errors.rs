//! Mapping error types and diagnostics.

use std::path::PathBuf;

use thiserror::Error;

use crate::toolchain::ToolchainError;
use crate::util::diagnostic::Diagnostic;

/// Error aborting a mapping call.
#[derive(Debug, Error)]
pub enum MapperError {
    #[error("toolchain unavailable: {0}")]
    Toolchain(#[from] ToolchainError),

    #[error("could not read the tools version of `{}`", path.display())]
    ToolVersion {
        path: PathBuf,
        #[source]
        source: ToolchainError,
    },

    #[error("failed to discover sources of plugin `{plugin}`")]
    Discovery {
        plugin: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("manifest `{}` is not inside a directory", path.display())]
    ManifestOutsideDirectory { path: PathBuf },

    #[error("plugin `{name}` is declared more than once")]
    DuplicatePlugin { name: String, paths: Vec<PathBuf> },
}

impl MapperError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            MapperError::Toolchain(err) => err.to_diagnostic(),

            MapperError::ToolVersion { path, source } => {
                let mut diag = source.to_diagnostic();
                diag.message = format!(
                    "could not read the tools version of `{}`",
                    path.display()
                );
                diag.with_location(path.clone())
                    .with_suggestion("Check that the package manifest starts with a tools version comment")
            }

            MapperError::Discovery { plugin, source } => {
                Diagnostic::error(format!("failed to discover sources of plugin `{}`", plugin))
                    .with_context(format!("{:#}", source))
            }

            MapperError::ManifestOutsideDirectory { path } => {
                Diagnostic::error("manifest is not inside a directory")
                    .with_location(path.clone())
                    .with_suggestion("Manifest targets are named after their parent directory")
            }

            MapperError::DuplicatePlugin { name, paths } => {
                let mut diag =
                    Diagnostic::error(format!("plugin `{}` is declared more than once", name));
                for path in paths {
                    diag = diag.with_context(format!("declared at {}", path.display()));
                }
                diag.with_suggestion("Give every plugin a unique name")
            }
        }
    }
}
