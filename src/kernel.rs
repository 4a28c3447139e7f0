//! Startup orchestration: load plugins, validate mounts, assemble the top-level router.

use crate::config::AppConfig;
use crate::docs::SYSTEM_ENDPOINTS;
use crate::error::ConfigError;
use crate::plugin::{load_plugins, PluginContext, PluginFactory, PluginRegistry};
use crate::request::Request;
use crate::response::Response;
use crate::routes::system_routes;
use crate::routing::{split_segments, ApiRouter};
use crate::state::AppState;
use crate::store::SharedStore;
use std::collections::HashSet;
use std::sync::Arc;

/// The assembled service. Nothing here changes after construction.
#[derive(Clone)]
pub struct Kernel {
    state: AppState,
    router: Arc<ApiRouter>,
}

impl Kernel {
    /// Run `factories` in order and assemble the result.
    pub fn build(config: Arc<AppConfig>, store: SharedStore, factories: &[PluginFactory]) -> Result<Self, ConfigError> {
        let ctx = PluginContext {
            store: store.clone(),
            config: config.clone(),
        };
        let registry = load_plugins(factories, &ctx)?;
        Self::assemble(config, store, registry)
    }

    /// Freeze `registry` and mount the system table plus one table per plugin.
    pub fn assemble(config: Arc<AppConfig>, store: SharedStore, registry: PluginRegistry) -> Result<Self, ConfigError> {
        validate_mounts(&registry)?;
        let registry = Arc::new(registry);
        let state = AppState::new(config, store, registry.clone());

        let mut router = ApiRouter::new();
        router.mount("system", "/", Arc::new(system_routes(state.clone())));
        for plugin in registry.all() {
            router.mount(plugin.name(), plugin.base_path(), plugin.routes().clone());
        }
        tracing::info!(
            plugins = registry.len(),
            routes = router.route_count(),
            store = state.store.kind(),
            "kernel ready"
        );
        Ok(Kernel {
            state,
            router: Arc::new(router),
        })
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn registry(&self) -> &PluginRegistry {
        &self.state.registry
    }

    pub fn router(&self) -> Arc<ApiRouter> {
        self.router.clone()
    }

    pub async fn handle(&self, req: Request) -> Response {
        self.router.handle(req).await
    }
}

/// Base paths must be literal, below the root, unique, and must not shadow a system endpoint.
fn validate_mounts(registry: &PluginRegistry) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for plugin in registry.all() {
        let invalid = || ConfigError::InvalidBasePath {
            plugin: plugin.name().to_string(),
            base_path: plugin.base_path().to_string(),
        };
        if !plugin.mounts_below_root() {
            return Err(invalid());
        }
        let segments = split_segments(plugin.base_path());
        if segments.iter().any(|s| s.contains('{') || s.contains('}')) {
            return Err(invalid());
        }
        let shadows_system = SYSTEM_ENDPOINTS.iter().any(|e| {
            let system = split_segments(e.path);
            system.len() >= segments.len() && system[..segments.len()] == segments[..]
        });
        if shadows_system {
            return Err(invalid());
        }
        let mount = plugin.mount_path();
        if !seen.insert(mount.clone()) {
            return Err(ConfigError::DuplicateBasePath(mount));
        }
    }
    Ok(())
}
