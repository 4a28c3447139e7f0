//! Append-only, load-ordered collection of plugin descriptors.

use crate::plugin::PluginDescriptor;
use std::sync::Arc;

/// Populated during startup, then frozen in an `Arc` by the kernel.
#[derive(Clone, Debug, Default)]
pub struct PluginRegistry {
    plugins: Vec<Arc<PluginDescriptor>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        PluginRegistry::default()
    }

    pub fn register(&mut self, descriptor: PluginDescriptor) -> &mut Self {
        tracing::info!(
            plugin = %descriptor.name(),
            base_path = %descriptor.mount_path(),
            routes = descriptor.routes().len(),
            "plugin registered"
        );
        self.plugins.push(Arc::new(descriptor));
        self
    }

    /// Descriptors in registration order.
    pub fn all(&self) -> &[Arc<PluginDescriptor>] {
        &self.plugins
    }

    pub fn get(&self, name: &str) -> Option<&Arc<PluginDescriptor>> {
        self.plugins.iter().find(|p| p.name() == name)
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}
