//! GET / and GET /api.

use crate::request::Request;
use crate::response::Response;
use crate::routing::{HandlerResult, Params};
use crate::state::{AppState, APPLICATION_NAME, APPLICATION_VERSION};
use axum::http::StatusCode;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PluginSummary {
    pub name: String,
    pub label: String,
    pub base_path: String,
    pub description: String,
    pub routes: usize,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SystemInfo {
    pub application: String,
    pub version: String,
    pub description: String,
    pub status: String,
    pub plugin_count: usize,
    pub plugins: Vec<PluginSummary>,
}

#[derive(Serialize, ToSchema)]
pub struct EndpointGroup {
    pub name: String,
    pub path: String,
    pub description: String,
}

#[derive(Serialize, ToSchema)]
pub struct ApiIndex {
    pub application: String,
    pub version: String,
    pub endpoints: Vec<EndpointGroup>,
}

fn group(name: &str, path: &str, description: &str) -> EndpointGroup {
    EndpointGroup {
        name: name.into(),
        path: path.into(),
        description: description.into(),
    }
}

pub async fn home(state: AppState, _req: Request, _params: Params) -> HandlerResult {
    let plugins: Vec<PluginSummary> = state
        .registry
        .all()
        .iter()
        .map(|p| PluginSummary {
            name: p.name().to_string(),
            label: p.label().to_string(),
            base_path: p.mount_path(),
            description: p.description().to_string(),
            routes: p.routes().len(),
        })
        .collect();
    Response::json(
        StatusCode::OK,
        &SystemInfo {
            application: APPLICATION_NAME.into(),
            version: APPLICATION_VERSION.into(),
            description: "REST API composed from independently packaged plugins".into(),
            status: "running".into(),
            plugin_count: plugins.len(),
            plugins,
        },
    )
}

pub async fn api_index(state: AppState, _req: Request, _params: Params) -> HandlerResult {
    let mut endpoints = vec![
        group("docs", "/api/docs", "Endpoint listing"),
        group("docs-spec", "/api/docs-spec", "OpenAPI document"),
        group("swagger-ui", "/api/swagger-ui", "Interactive documentation"),
        group("health", "/api/health", "Liveness and component health"),
    ];
    endpoints.extend(state.registry.all().iter().map(|p| {
        let description = if p.description().is_empty() {
            p.label()
        } else {
            p.description()
        };
        group(p.name(), &p.mount_path(), description)
    }));
    Response::json(
        StatusCode::OK,
        &ApiIndex {
            application: APPLICATION_NAME.into(),
            version: APPLICATION_VERSION.into(),
            endpoints,
        },
    )
}
