//! Fixed system endpoints and their documentation fragments.

use crate::docs::aggregator::{DocFragments, TagEntry};
use crate::docs::operation::{schema_of, schema_ref, OperationDoc};
use crate::error::ErrorBody;
use crate::response::MetaCount;
use crate::handlers::docs::{DocsListing, EndpointDoc, PluginEndpoints};
use crate::handlers::health::{
    ApiHealth, DatabaseHealth, DetailedHealth, HealthComponents, HealthStatus, PluginsHealth, StoreHealth,
};
use crate::handlers::home::{ApiIndex, EndpointGroup, PluginSummary, SystemInfo};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub const SYSTEM_TAG: &str = "System";

#[derive(Clone, Copy, Debug)]
pub struct SystemEndpoint {
    pub method: &'static str,
    pub path: &'static str,
    pub summary: &'static str,
    /// Component schema of the 200 response; `None` for non-JSON or free-form bodies.
    pub schema: Option<&'static str>,
}

const fn endpoint(path: &'static str, summary: &'static str, schema: Option<&'static str>) -> SystemEndpoint {
    SystemEndpoint {
        method: "GET",
        path,
        summary,
        schema,
    }
}

pub const SYSTEM_ENDPOINTS: &[SystemEndpoint] = &[
    endpoint("/", "System summary and loaded plugins", Some("SystemInfo")),
    endpoint("/api", "Top-level endpoint groups", Some("ApiIndex")),
    endpoint("/api/docs", "Endpoint listing across all plugins", Some("DocsListing")),
    endpoint("/api/health", "Liveness", Some("HealthStatus")),
    endpoint("/api/health/detailed", "Liveness with per-component status", Some("DetailedHealth")),
    endpoint("/api/health/database", "Storage connectivity and row counts", Some("DatabaseHealth")),
    endpoint("/api/docs-spec", "Merged OpenAPI document", None),
    endpoint("/api/swagger-ui", "Swagger UI page", None),
];

fn schemas() -> BTreeMap<String, Value> {
    [
        schema_of::<ErrorBody>(),
        schema_of::<MetaCount>(),
        schema_of::<SystemInfo>(),
        schema_of::<PluginSummary>(),
        schema_of::<ApiIndex>(),
        schema_of::<EndpointGroup>(),
        schema_of::<DocsListing>(),
        schema_of::<PluginEndpoints>(),
        schema_of::<EndpointDoc>(),
        schema_of::<HealthStatus>(),
        schema_of::<DetailedHealth>(),
        schema_of::<HealthComponents>(),
        schema_of::<StoreHealth>(),
        schema_of::<PluginsHealth>(),
        schema_of::<ApiHealth>(),
        schema_of::<DatabaseHealth>(),
    ]
    .into_iter()
    .collect()
}

/// Baseline fragments every aggregated document starts from.
pub fn system_fragments() -> DocFragments {
    let mut paths = BTreeMap::new();
    for e in SYSTEM_ENDPOINTS {
        let doc = OperationDoc::new(e.summary).tag(SYSTEM_TAG);
        let doc = match e.schema {
            Some(name) => doc.response_with(200, "OK", schema_ref(name)),
            None => doc.response(200, "OK"),
        };
        let mut item = Map::new();
        item.insert(e.method.to_ascii_lowercase(), doc.to_value());
        paths.insert(e.path.to_string(), Value::Object(item));
    }
    DocFragments {
        paths,
        schemas: schemas(),
        tags: vec![TagEntry::new(SYSTEM_TAG, Some("Health, discovery and documentation".into()))],
    }
}
