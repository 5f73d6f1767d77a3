//! Mappers from project descriptions to the build graph.

pub mod dependencies;
pub mod editor;
pub mod errors;
pub mod schemes;

pub use dependencies::GraphDependencyResolver;
pub use editor::{EditorGraphMapper, EditorInput, PluginDescriptor};
pub use errors::MapperError;
