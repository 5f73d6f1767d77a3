//! Target definitions - what gets built.
//!
//! A Target is one buildable, testable or runnable unit owned by a project.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::core::settings::SettingsDictionary;

/// The kind of product a target builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Product {
    /// Application bundle
    #[serde(alias = "application")]
    App,
    /// Command-line executable
    #[serde(alias = "tool")]
    CommandLineTool,
    /// Lightweight app clip
    AppClip,
    /// Watch application
    WatchApp,
    /// Static library
    #[serde(alias = "static")]
    StaticLibrary,
    /// Dynamic library
    #[serde(alias = "dynamic")]
    DynamicLibrary,
    /// Dynamic framework
    Framework,
    /// Static framework
    StaticFramework,
    /// Resource bundle
    Bundle,
    /// Unit test bundle
    UnitTests,
    /// UI test bundle
    #[serde(alias = "ui_test")]
    UiTests,
    /// App extension
    AppExtension,
    /// Watch extension
    WatchExtension,
    /// Messages extension
    MessagesExtension,
    /// Sticker pack extension
    StickerPackExtension,
    /// ExtensionKit extension
    ExtensionKitExtension,
    /// System extension
    SystemExtension,
    /// XPC service
    XpcService,
    /// Compiler macro
    Macro,
}

impl Default for Product {
    fn default() -> Self {
        Product::App
    }
}

impl Product {
    /// Check if this product is a unit or UI test bundle.
    pub fn is_test_bundle(&self) -> bool {
        matches!(self, Product::UnitTests | Product::UiTests)
    }

    /// Check if this product can be launched by a run action.
    pub fn is_runnable(&self) -> bool {
        matches!(
            self,
            Product::App | Product::CommandLineTool | Product::AppClip | Product::WatchApp
        )
    }

    /// Check if this product is an extension hosted by another target.
    pub fn is_extension(&self) -> bool {
        matches!(
            self,
            Product::AppExtension
                | Product::WatchExtension
                | Product::MessagesExtension
                | Product::StickerPackExtension
                | Product::ExtensionKitExtension
                | Product::SystemExtension
                | Product::XpcService
        )
    }

    /// Check if this product can host tests and embedded extensions.
    pub fn can_host_tests(&self) -> bool {
        matches!(self, Product::App | Product::AppClip | Product::WatchApp)
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Product::App => "app",
            Product::CommandLineTool => "command_line_tool",
            Product::AppClip => "app_clip",
            Product::WatchApp => "watch_app",
            Product::StaticLibrary => "static_library",
            Product::DynamicLibrary => "dynamic_library",
            Product::Framework => "framework",
            Product::StaticFramework => "static_framework",
            Product::Bundle => "bundle",
            Product::UnitTests => "unit_tests",
            Product::UiTests => "ui_tests",
            Product::AppExtension => "app_extension",
            Product::WatchExtension => "watch_extension",
            Product::MessagesExtension => "messages_extension",
            Product::StickerPackExtension => "sticker_pack_extension",
            Product::ExtensionKitExtension => "extension_kit_extension",
            Product::SystemExtension => "system_extension",
            Product::XpcService => "xpc_service",
            Product::Macro => "macro",
        };
        write!(f, "{}", name)
    }
}

/// A platform a target can be built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Ios,
    Macos,
    Tvos,
    Watchos,
    Visionos,
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Ios => write!(f, "iOS"),
            Platform::Macos => write!(f, "macOS"),
            Platform::Tvos => write!(f, "tvOS"),
            Platform::Watchos => write!(f, "watchOS"),
            Platform::Visionos => write!(f, "visionOS"),
        }
    }
}

/// Restricts a dependency to a subset of platforms.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlatformCondition {
    pub platforms: BTreeSet<Platform>,
}

/// A symbolic dependency declared by a target.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TargetDependency {
    /// Another target, by name. Without `project` it lives in the same
    /// project as the dependent.
    Target {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        project: Option<PathBuf>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        condition: Option<PlatformCondition>,
    },

    /// A product of an external package
    Package { product: String },

    /// A system library or framework
    Sdk {
        name: String,
        #[serde(default)]
        optional: bool,
    },
}

impl TargetDependency {
    /// A by-name dependency on a target in the same project.
    pub fn target(name: impl Into<String>) -> Self {
        TargetDependency::Target {
            name: name.into(),
            project: None,
            condition: None,
        }
    }

    /// A by-name dependency on a target in another project.
    pub fn project(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        TargetDependency::Target {
            name: name.into(),
            project: Some(path.into()),
            condition: None,
        }
    }

    /// Name of the referenced target, for by-name dependencies.
    pub fn target_name(&self) -> Option<&str> {
        match self {
            TargetDependency::Target { name, .. } => Some(name),
            _ => None,
        }
    }
}

/// A launch argument passed to a run or test action.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LaunchArgument {
    pub name: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl LaunchArgument {
    pub fn new(name: impl Into<String>) -> Self {
        LaunchArgument {
            name: name.into(),
            enabled: true,
        }
    }
}

/// A target with its configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Target {
    /// Target name, unique within its project
    pub name: String,

    /// What kind of product to build
    #[serde(default)]
    pub product: Product,

    /// Platforms the target supports
    #[serde(default)]
    pub platforms: BTreeSet<Platform>,

    /// Compiled source files
    #[serde(default)]
    pub sources: Vec<PathBuf>,

    /// Files shown in the project but not compiled
    #[serde(default)]
    pub additional_files: Vec<PathBuf>,

    /// Build settings
    #[serde(default)]
    pub settings: SettingsDictionary,

    /// Declared dependencies
    #[serde(default)]
    pub dependencies: Vec<TargetDependency>,

    /// Environment variables for run/test actions
    #[serde(default)]
    pub environment: BTreeMap<String, String>,

    /// Launch arguments for run/test actions
    #[serde(default)]
    pub launch_arguments: Vec<LaunchArgument>,
}

impl Target {
    /// Create a new target with the given name and product.
    pub fn new(name: impl Into<String>, product: Product) -> Self {
        Target {
            name: name.into(),
            product,
            platforms: BTreeSet::new(),
            sources: Vec::new(),
            additional_files: Vec::new(),
            settings: SettingsDictionary::new(),
            dependencies: Vec::new(),
            environment: BTreeMap::new(),
            launch_arguments: Vec::new(),
        }
    }

    /// Set the supported platforms.
    pub fn with_platforms(mut self, platforms: impl IntoIterator<Item = Platform>) -> Self {
        self.platforms = platforms.into_iter().collect();
        self
    }

    /// Set the source files.
    pub fn with_sources(mut self, sources: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        self.sources = sources.into_iter().map(Into::into).collect();
        self
    }

    /// Set the additional (non-compiled) files.
    pub fn with_additional_files(
        mut self,
        files: impl IntoIterator<Item = impl Into<PathBuf>>,
    ) -> Self {
        self.additional_files = files.into_iter().map(Into::into).collect();
        self
    }

    /// Set the build settings.
    pub fn with_settings(mut self, settings: SettingsDictionary) -> Self {
        self.settings = settings;
        self
    }

    /// Set the dependencies.
    pub fn with_dependencies(mut self, deps: impl IntoIterator<Item = TargetDependency>) -> Self {
        self.dependencies = deps.into_iter().collect();
        self
    }

    /// Add an environment variable.
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.environment.insert(key.into(), value.into());
        self
    }

    /// Add a launch argument.
    pub fn with_launch_argument(mut self, argument: LaunchArgument) -> Self {
        self.launch_arguments.push(argument);
        self
    }

    /// Check if this target declares a by-name dependency on `name`.
    pub fn depends_on(&self, name: &str) -> bool {
        self.dependencies
            .iter()
            .any(|d| d.target_name() == Some(name))
    }
}
