//! Shared application state for system routes. Frozen once the kernel is built.

use crate::config::AppConfig;
use crate::docs::{system_fragments, AggregatedDocument, DocInfo, DocumentationAggregator};
use crate::plugin::PluginRegistry;
use crate::store::SharedStore;
use chrono::{DateTime, Utc};
use std::sync::Arc;

pub const APPLICATION_NAME: &str = "microkernel-api";
pub const APPLICATION_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: SharedStore,
    pub registry: Arc<PluginRegistry>,
    pub started_at: DateTime<Utc>,
    aggregator: Arc<DocumentationAggregator>,
}

impl AppState {
    pub fn new(config: Arc<AppConfig>, store: SharedStore, registry: Arc<PluginRegistry>) -> Self {
        AppState {
            config,
            store,
            registry,
            started_at: Utc::now(),
            aggregator: Arc::new(DocumentationAggregator::new(system_fragments())),
        }
    }

    pub fn uptime_seconds(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds().max(0)
    }

    /// Built on every call from the frozen registry.
    pub fn document(&self) -> AggregatedDocument {
        self.aggregator.aggregate(self.registry.all().iter().map(|p| p.as_ref()))
    }

    pub fn doc_info(&self) -> DocInfo {
        DocInfo {
            title: "Microkernel API".into(),
            version: APPLICATION_VERSION.into(),
            description: "REST API composed from independently packaged plugins".into(),
            server_url: self.config.public_url.clone(),
        }
    }

    pub fn plugin_route_count(&self) -> usize {
        self.registry.all().iter().map(|p| p.routes().len()).sum()
    }
}
