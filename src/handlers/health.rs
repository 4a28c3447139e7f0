//! Health endpoints: liveness, component status and storage checks.

use crate::request::Request;
use crate::response::Response;
use crate::routing::{HandlerResult, Params};
use crate::state::{AppState, APPLICATION_NAME, APPLICATION_VERSION};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub status: String,
    pub application: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub uptime_seconds: i64,
}

#[derive(Serialize, ToSchema)]
pub struct StoreHealth {
    pub status: String,
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct PluginsHealth {
    pub status: String,
    pub count: usize,
    pub loaded: Vec<String>,
}

#[derive(Serialize, ToSchema)]
pub struct ApiHealth {
    pub status: String,
    pub endpoints: usize,
}

#[derive(Serialize, ToSchema)]
pub struct HealthComponents {
    pub store: StoreHealth,
    pub plugins: PluginsHealth,
    pub api: ApiHealth,
}

/// `status` is `DEGRADED` when any component is down.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DetailedHealth {
    pub status: String,
    pub application: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub uptime_seconds: i64,
    pub components: HealthComponents,
}

/// Row counts are `-1` for collections that could not be counted.
#[derive(Serialize, ToSchema)]
pub struct DatabaseHealth {
    pub status: String,
    pub kind: String,
    pub timestamp: DateTime<Utc>,
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub data: BTreeMap<String, i64>,
}

pub async fn health(state: AppState, _req: Request, _params: Params) -> HandlerResult {
    Response::json(
        StatusCode::OK,
        &HealthStatus {
            status: "UP".into(),
            application: APPLICATION_NAME.into(),
            version: APPLICATION_VERSION.into(),
            timestamp: Utc::now(),
            uptime_seconds: state.uptime_seconds(),
        },
    )
}

pub async fn detailed(state: AppState, _req: Request, _params: Params) -> HandlerResult {
    let ping = state.store.ping().await;
    let store_up = ping.is_ok();
    let loaded: Vec<String> = state.registry.all().iter().map(|p| p.name().to_string()).collect();
    let body = DetailedHealth {
        status: String::from(if store_up { "UP" } else { "DEGRADED" }),
        application: APPLICATION_NAME.into(),
        version: APPLICATION_VERSION.into(),
        timestamp: Utc::now(),
        uptime_seconds: state.uptime_seconds(),
        components: HealthComponents {
            store: StoreHealth {
                status: String::from(if store_up { "UP" } else { "DOWN" }),
                kind: state.store.kind().into(),
                error: ping.err().map(|e| e.to_string()),
            },
            plugins: PluginsHealth {
                status: "UP".into(),
                count: loaded.len(),
                loaded,
            },
            api: ApiHealth {
                status: "UP".into(),
                endpoints: crate::docs::SYSTEM_ENDPOINTS.len() + state.plugin_route_count(),
            },
        },
    };
    Response::json(StatusCode::OK, &body)
}

pub async fn database(state: AppState, _req: Request, _params: Params) -> HandlerResult {
    let ping = state.store.ping().await;
    let connected = ping.is_ok();
    let mut data = BTreeMap::new();
    let mut counts_ok = true;
    if connected {
        for plugin in state.registry.all() {
            for collection in plugin.collections() {
                let count = match state.store.count(collection).await {
                    Ok(n) => i64::try_from(n).unwrap_or(i64::MAX),
                    Err(err) => {
                        tracing::warn!(collection = %collection, error = %err, "row count failed");
                        counts_ok = false;
                        -1
                    }
                };
                data.insert(collection.clone(), count);
            }
        }
    }
    let healthy = connected && counts_ok;
    Response::json(
        StatusCode::OK,
        &DatabaseHealth {
            status: String::from(if healthy { "HEALTHY" } else { "UNHEALTHY" }),
            kind: state.store.kind().into(),
            timestamp: Utc::now(),
            connected,
            error: ping.err().map(|e| e.to_string()),
            data,
        },
    )
}
