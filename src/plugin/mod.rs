//! Plugin capability records, the registry that collects them and the startup loader.

pub mod descriptor;
pub mod loader;
pub mod registry;

pub use descriptor::{PluginBuilder, PluginDescriptor};
pub use loader::{load_plugins, PluginConstructor, PluginContext, PluginFactory};
pub use registry::PluginRegistry;
