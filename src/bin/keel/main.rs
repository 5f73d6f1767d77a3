//! Keel CLI - project graphs and schemes from declarative descriptions

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use keel::core::graph::GraphError;
use keel::mapper::MapperError;
use keel::util::diagnostic::emit;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    let color = !cli.no_color;

    if let Err(e) = run(cli) {
        if let Some(err) = e.downcast_ref::<MapperError>() {
            emit(&err.to_diagnostic(), color);
        } else if let Some(err) = e.downcast_ref::<GraphError>() {
            emit(&err.to_diagnostic(), color);
        } else {
            eprintln!("error: {:#}", e);
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("keel=debug")
    } else {
        EnvFilter::new("keel=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    // Execute command
    match cli.command {
        Commands::Edit(args) => commands::edit::execute(args, cli.no_color),
        Commands::Schemes(args) => commands::schemes::execute(args),
        Commands::Tree(args) => commands::tree::execute(args),
    }
}
