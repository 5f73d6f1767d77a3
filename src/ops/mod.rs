//! High-level operations.
//!
//! This module contains the implementation of Keel commands.

pub mod edit;
pub mod schemes;

pub use edit::{discover, edit, parse_plugin, EditOptions};
pub use schemes::{
    build_graph, load_description, load_graph, synthesize_schemes, Description, SchemesOptions,
};
