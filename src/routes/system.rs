//! System route table, mounted at `/`.

use crate::handlers::{docs, health, home};
use crate::routing::{Handler, RouteTable};
use crate::state::AppState;

/// Every route here has a matching entry in [`crate::docs::SYSTEM_ENDPOINTS`].
pub fn system_routes(state: AppState) -> RouteTable {
    RouteTable::new()
        .get("/", Handler::with_state(state.clone(), home::home))
        .get("/api", Handler::with_state(state.clone(), home::api_index))
        .get("/api/docs", Handler::with_state(state.clone(), docs::listing))
        .get("/api/health", Handler::with_state(state.clone(), health::health))
        .get("/api/health/detailed", Handler::with_state(state.clone(), health::detailed))
        .get("/api/health/database", Handler::with_state(state.clone(), health::database))
        .get("/api/docs-spec", Handler::with_state(state.clone(), docs::spec))
        .get("/api/swagger-ui", Handler::with_state(state, docs::swagger_ui))
}
