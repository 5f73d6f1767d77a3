//! Parsing of toolchain driver output.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use semver::Version;

static LANGUAGE_VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Swift version (\d+\.\d+(?:\.\d+)?)").expect("valid language version regex")
});

static TOOLS_VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\.(\d+)(?:\.(\d+))?").expect("valid tools version regex"));

/// Extract the language version from `swift --version` output.
pub fn parse_language_version(output: &str) -> Option<String> {
    LANGUAGE_VERSION
        .captures(output)
        .map(|caps| caps[1].to_string())
}

/// Extract the tools version from `swift package tools-version` output.
///
/// Two-component versions are padded to a full semantic version.
pub fn parse_tools_version(output: &str) -> Option<Version> {
    let caps = TOOLS_VERSION.captures(output)?;
    let major = caps[1].parse().ok()?;
    let minor = caps[2].parse().ok()?;
    let patch = match caps.get(3) {
        Some(m) => m.as_str().parse().ok()?,
        None => 0,
    };
    Some(Version::new(major, minor, patch))
}

/// Toolchain root for a driver at `<root>/usr/bin/swift`.
pub fn toolchain_root(driver: &Path) -> Option<PathBuf> {
    let bin = driver.parent()?;
    let usr = bin.parent()?;
    if usr.file_name().map(|n| n == "usr").unwrap_or(false) {
        usr.parent().map(Path::to_path_buf)
    } else {
        Some(usr.to_path_buf())
    }
}
