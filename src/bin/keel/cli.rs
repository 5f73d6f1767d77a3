//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Keel - project graphs and schemes from declarative project descriptions
#[derive(Parser)]
#[command(name = "keel")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build the graph for editing manifests and plugins
    Edit(EditArgs),

    /// Synthesize the schemes of a project description
    Schemes(SchemesArgs),

    /// Print the targets of a graph in dependency order
    Tree(TreeArgs),
}

#[derive(Args)]
pub struct EditArgs {
    /// Root of the project to edit (defaults to the current directory)
    pub path: Option<PathBuf>,

    /// Plugin to include, as NAME=PATH
    #[arg(long = "plugin", value_name = "NAME=PATH")]
    pub plugins: Vec<String>,

    /// Helper library built for a plugin
    #[arg(long = "helper-library", value_name = "PATH")]
    pub helper_libraries: Vec<PathBuf>,

    /// Directory the editor projects are generated in
    #[arg(long, value_name = "DIR")]
    pub destination: Option<PathBuf>,

    /// Directory containing the project description framework
    #[arg(long, value_name = "DIR", env = "KEEL_FRAMEWORK_DIR")]
    pub framework_dir: Option<PathBuf>,

    /// Generate the workspace scheme even if configuration disables it
    #[arg(long)]
    pub workspace_scheme: bool,

    /// Print the graph as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct SchemesArgs {
    /// Project description (.toml or .json)
    pub file: PathBuf,

    /// Generate the workspace scheme even if configuration disables it
    #[arg(long)]
    pub workspace_scheme: bool,

    /// Print the schemes as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct TreeArgs {
    /// Serialized graph or project description (.toml or .json)
    pub file: PathBuf,
}
