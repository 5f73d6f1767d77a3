//! Build settings and the settings composer.
//!
//! Settings are a flat dictionary of string keys to either a scalar or an
//! array value. Composing dictionaries concatenates arrays and lets the
//! latest scalar win.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Search paths for frameworks.
pub const FRAMEWORK_SEARCH_PATHS: &str = "FRAMEWORK_SEARCH_PATHS";

/// Search paths for compiled module interfaces.
pub const SWIFT_INCLUDE_PATHS: &str = "SWIFT_INCLUDE_PATHS";

/// Extra compiler flags.
pub const OTHER_SWIFT_FLAGS: &str = "OTHER_SWIFT_FLAGS";

/// Language version the target compiles with.
pub const SWIFT_VERSION: &str = "SWIFT_VERSION";

/// A single build setting value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    /// Scalar value
    String(String),
    /// Array value (search paths, flags)
    Array(Vec<String>),
}

impl SettingValue {
    /// Create an array value from anything that yields strings.
    pub fn array(values: impl IntoIterator<Item = impl Into<String>>) -> Self {
        SettingValue::Array(values.into_iter().map(Into::into).collect())
    }
}

impl From<&str> for SettingValue {
    fn from(s: &str) -> Self {
        SettingValue::String(s.to_string())
    }
}

impl From<String> for SettingValue {
    fn from(s: String) -> Self {
        SettingValue::String(s)
    }
}

impl From<Vec<String>> for SettingValue {
    fn from(values: Vec<String>) -> Self {
        SettingValue::Array(values)
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingValue::String(s) => write!(f, "{}", s),
            SettingValue::Array(values) => write!(f, "{}", values.join(" ")),
        }
    }
}

/// An ordered dictionary of build settings.
pub type SettingsDictionary = BTreeMap<String, SettingValue>;

/// Merge `contribution` into `accumulator`.
///
/// Two array values under the same key concatenate, accumulator first.
/// Any other combination is overwritten by the contribution.
pub fn merge_into(accumulator: &mut SettingsDictionary, contribution: &SettingsDictionary) {
    for (key, value) in contribution {
        match (accumulator.get_mut(key), value) {
            (Some(SettingValue::Array(existing)), SettingValue::Array(new)) => {
                existing.extend(new.iter().cloned());
            }
            _ => {
                accumulator.insert(key.clone(), value.clone());
            }
        }
    }
}

/// Compose a base dictionary with contributions, in priority order.
///
/// Later contributions win for scalar settings, so callers must pass them
/// in the order they should apply.
pub fn compose<'a>(
    base: &SettingsDictionary,
    contributions: impl IntoIterator<Item = &'a SettingsDictionary>,
) -> SettingsDictionary {
    let mut result = base.clone();
    for contribution in contributions {
        merge_into(&mut result, contribution);
    }
    result
}

/// Build a dictionary from key/value pairs.
pub fn settings<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> SettingsDictionary
where
    K: Into<String>,
    V: Into<SettingValue>,
{
    entries
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}
