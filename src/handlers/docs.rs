//! Documentation endpoints: endpoint listing, merged OpenAPI document and Swagger UI page.

use crate::docs::SYSTEM_ENDPOINTS;
use crate::request::Request;
use crate::response::Response;
use crate::routing::{join_paths, HandlerResult, Params};
use crate::state::{AppState, APPLICATION_VERSION};
use axum::http::StatusCode;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct EndpointDoc {
    pub method: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PluginEndpoints {
    pub name: String,
    pub label: String,
    pub base_path: String,
    pub endpoints: Vec<EndpointDoc>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocsListing {
    pub title: String,
    pub version: String,
    pub spec_url: String,
    pub system: Vec<EndpointDoc>,
    pub plugins: Vec<PluginEndpoints>,
    /// Plugins left out of the merged document.
    pub omitted: Vec<String>,
}

pub async fn listing(state: AppState, _req: Request, _params: Params) -> HandlerResult {
    let system = SYSTEM_ENDPOINTS
        .iter()
        .map(|e| EndpointDoc {
            method: e.method.to_string(),
            path: e.path.to_string(),
            summary: Some(e.summary.to_string()),
        })
        .collect();
    let plugins = state
        .registry
        .all()
        .iter()
        .map(|p| PluginEndpoints {
            name: p.name().to_string(),
            label: p.label().to_string(),
            base_path: p.mount_path(),
            endpoints: p
                .routes()
                .entries()
                .iter()
                .map(|entry| EndpointDoc {
                    method: entry.method.to_string(),
                    path: join_paths(p.base_path(), entry.pattern.as_str()),
                    summary: p
                        .operation_summary(&entry.method, entry.pattern.as_str())
                        .map(str::to_string),
                })
                .collect(),
        })
        .collect();
    let omitted = state.document().omitted.into_iter().map(|o| o.plugin).collect();
    Response::json(
        StatusCode::OK,
        &DocsListing {
            title: "Microkernel API".into(),
            version: APPLICATION_VERSION.into(),
            spec_url: "/api/docs-spec".into(),
            system,
            plugins,
            omitted,
        },
    )
}

pub async fn spec(state: AppState, _req: Request, _params: Params) -> HandlerResult {
    let document = state.document().to_openapi(&state.doc_info());
    Response::json(StatusCode::OK, &document)
}

const SWAGGER_UI_PAGE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <title>Microkernel API</title>
  <link rel="stylesheet" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css" />
</head>
<body>
  <div id="swagger-ui"></div>
  <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js" crossorigin></script>
  <script>
    window.onload = () => {
      window.ui = SwaggerUIBundle({ url: "/api/docs-spec", dom_id: "#swagger-ui" });
    };
  </script>
</body>
</html>
"##;

pub async fn swagger_ui(_state: AppState, _req: Request, _params: Params) -> HandlerResult {
    Ok(Response::html(StatusCode::OK, SWAGGER_UI_PAGE))
}
