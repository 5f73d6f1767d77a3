//! Filesystem capabilities.
//!
//! Mappers never touch the filesystem directly; they receive a [`Globber`]
//! so tests can substitute an in-memory tree.

use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};

/// Finds files matching glob patterns.
pub trait Globber: Send + Sync {
    /// Check whether a file or directory exists.
    fn exists(&self, path: &Path) -> bool;

    /// Find files under `directory` matching any of `patterns`.
    ///
    /// Results are sorted and deduplicated.
    fn glob(&self, directory: &Path, patterns: &[String]) -> Result<Vec<PathBuf>>;
}

/// [`Globber`] backed by the real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsGlobber;

impl Globber for FsGlobber {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn glob(&self, directory: &Path, patterns: &[String]) -> Result<Vec<PathBuf>> {
        glob_files(directory, patterns)
    }
}

/// Find files matching glob patterns relative to a base directory.
pub fn glob_files(base: &Path, patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut results = Vec::new();

    for pattern in patterns {
        let full_pattern = base.join(pattern);
        let pattern_str = full_pattern.to_string_lossy();

        for entry in glob::glob(&pattern_str)
            .with_context(|| format!("invalid glob pattern: {}", pattern))?
        {
            let path = entry.with_context(|| {
                format!("failed to read entries under {}", base.display())
            })?;
            if path.is_file() {
                results.push(path);
            }
        }
    }

    results.sort();
    results.dedup();
    Ok(results)
}

/// Base name of the directory containing `path`, if any.
pub fn parent_dir_name(path: &Path) -> Option<String> {
    path.parent()
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned())
}

/// Resolve `.` and `..` components without touching the filesystem.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !result.pop() {
                    result.push("..");
                }
            }
            other => result.push(other.as_os_str()),
        }
    }
    result
}

/// Read a file to string, with nice error messages.
pub fn read_to_string(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("failed to read file: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_glob_files() {
        let tmp = TempDir::new().unwrap();
        let helpers = tmp.path().join("ProjectDescriptionHelpers");
        fs::create_dir_all(helpers.join("nested")).unwrap();
        fs::write(helpers.join("Project+App.swift"), "").unwrap();
        fs::write(helpers.join("nested/Extra.swift"), "").unwrap();
        fs::write(helpers.join("README.md"), "").unwrap();

        let files = FsGlobber
            .glob(&helpers, &["**/*.swift".to_string()])
            .unwrap();
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|f| f.extension().unwrap() == "swift"));
    }

    #[test]
    fn test_glob_missing_directory_is_empty() {
        let tmp = TempDir::new().unwrap();
        let files = glob_files(&tmp.path().join("missing"), &["*.swift".to_string()]).unwrap();
        assert!(files.is_empty());
        assert!(!FsGlobber.exists(&tmp.path().join("missing")));
    }

    #[test]
    fn test_overlapping_patterns_dedup() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("A.swift"), "").unwrap();

        let files = glob_files(
            tmp.path(),
            &["*.swift".to_string(), "**/*.swift".to_string()],
        )
        .unwrap();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(
            normalize_path(Path::new("/work/App/../Kit/./Sources")),
            PathBuf::from("/work/Kit/Sources")
        );
        assert_eq!(normalize_path(Path::new("../Kit")), PathBuf::from("../Kit"));
    }

    #[test]
    fn test_parent_dir_name() {
        assert_eq!(
            parent_dir_name(Path::new("/work/App/Project.swift")),
            Some("App".to_string())
        );
        assert_eq!(parent_dir_name(Path::new("Project.swift")), None);
    }
}
