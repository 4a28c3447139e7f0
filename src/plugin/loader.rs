//! Runs the explicit, ordered list of plugin constructors.

use crate::config::{AppConfig, FailurePolicy};
use crate::error::{AppError, ConfigError};
use crate::plugin::{PluginDescriptor, PluginRegistry};
use crate::store::SharedStore;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

/// What a plugin receives at construction time.
#[derive(Clone)]
pub struct PluginContext {
    pub store: SharedStore,
    pub config: Arc<AppConfig>,
}

pub type PluginConstructor = fn(&PluginContext) -> Result<PluginDescriptor, AppError>;

/// A named constructor. The name is known before construction so disabled plugins are never built.
#[derive(Clone, Copy)]
pub struct PluginFactory {
    pub name: &'static str,
    pub construct: PluginConstructor,
}

impl PluginFactory {
    pub const fn new(name: &'static str, construct: PluginConstructor) -> Self {
        PluginFactory { name, construct }
    }
}

impl std::fmt::Debug for PluginFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginFactory").field("name", &self.name).finish_non_exhaustive()
    }
}

/// Construct every enabled plugin in list order and register it.
///
/// A constructor that returns an error or panics is skipped with a warning under
/// [`FailurePolicy::Skip`] and fails startup under [`FailurePolicy::Abort`].
pub fn load_plugins(factories: &[PluginFactory], ctx: &PluginContext) -> Result<PluginRegistry, ConfigError> {
    let mut registry = PluginRegistry::new();
    for factory in factories {
        if ctx.config.is_disabled(factory.name) {
            tracing::info!(plugin = %factory.name, "plugin disabled by configuration");
            continue;
        }
        let outcome = catch_unwind(AssertUnwindSafe(|| (factory.construct)(ctx)));
        let reason = match outcome {
            Ok(Ok(descriptor)) => {
                registry.register(descriptor);
                continue;
            }
            Ok(Err(err)) => err.to_string(),
            Err(_) => "constructor panicked".to_string(),
        };
        match ctx.config.plugin_failure_policy {
            FailurePolicy::Skip => {
                tracing::warn!(plugin = %factory.name, reason = %reason, "plugin failed to initialize; skipping");
            }
            FailurePolicy::Abort => {
                tracing::error!(plugin = %factory.name, reason = %reason, "plugin failed to initialize");
                return Err(ConfigError::PluginInit {
                    plugin: factory.name.to_string(),
                    reason,
                });
            }
        }
    }
    Ok(registry)
}
