//! Top-level router: route tables mounted under base paths, selected by longest segment prefix.

use crate::error::AppError;
use crate::request::Request;
use crate::response::Response;
use crate::routing::dispatcher::Dispatcher;
use crate::routing::pattern::split_segments;
use crate::routing::table::RouteTable;
use std::sync::Arc;

#[derive(Clone, Debug)]
struct Mount {
    name: String,
    base_path: String,
    segments: Vec<String>,
    dispatcher: Dispatcher,
}

impl Mount {
    fn covers(&self, path_segments: &[&str]) -> bool {
        self.segments.len() <= path_segments.len()
            && self.segments.iter().zip(path_segments).all(|(a, b)| a == b)
    }
}

/// Immutable once serving starts; shared across workers behind an `Arc`.
#[derive(Clone, Debug, Default)]
pub struct ApiRouter {
    mounts: Vec<Mount>,
}

impl ApiRouter {
    pub fn new() -> Self {
        ApiRouter::default()
    }

    /// Mount `table` under `base_path`. Requests below the base path are resolved against the
    /// table with the base path stripped, e.g. `/api/users/42` is resolved as `/42`.
    pub fn mount(&mut self, name: impl Into<String>, base_path: &str, table: Arc<RouteTable>) -> &mut Self {
        let segments: Vec<String> = split_segments(base_path).into_iter().map(String::from).collect();
        self.mounts.push(Mount {
            name: name.into(),
            base_path: format!("/{}", segments.join("/")),
            segments,
            dispatcher: Dispatcher::new(table),
        });
        self
    }

    /// (name, base path) of each mount in mount order.
    pub fn mounts(&self) -> impl Iterator<Item = (&str, &str)> {
        self.mounts.iter().map(|m| (m.name.as_str(), m.base_path.as_str()))
    }

    pub fn route_count(&self) -> usize {
        self.mounts.iter().map(|m| m.dispatcher.table().len()).sum()
    }

    pub async fn handle(&self, req: Request) -> Response {
        let owned_path = req.path.clone();
        let segments = split_segments(&owned_path);
        let selected = self
            .mounts
            .iter()
            .filter(|m| m.covers(&segments))
            .max_by_key(|m| m.segments.len());
        match selected {
            Some(mount) => {
                let local = format!("/{}", segments[mount.segments.len()..].join("/"));
                mount.dispatcher.dispatch(req, &local).await
            }
            None => {
                tracing::debug!(method = %req.method, path = %req.path, "no mount for path");
                AppError::RouteNotFound {
                    method: req.method,
                    path: req.path,
                }
                .into()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::Response;
    use crate::routing::table::Handler;
    use axum::http::{Method, StatusCode};

    fn labelled(label: &'static str) -> Handler {
        Handler::new(move |_req, params| async move {
            Response::json(StatusCode::OK, &serde_json::json!({ "by": label, "params": params.values() }))
        })
    }

    fn router() -> ApiRouter {
        let system = RouteTable::new()
            .get("/", labelled("home"))
            .get("/api/health", labelled("health"));
        let users = RouteTable::new()
            .get("/", labelled("users-list"))
            .get("/{id}", labelled("users-one"));
        let mut router = ApiRouter::new();
        router
            .mount("system", "/", Arc::new(system))
            .mount("users", "/api/users", Arc::new(users));
        router
    }

    async fn by(router: &ApiRouter, path: &str) -> serde_json::Value {
        router.handle(Request::new(Method::GET, path)).await.body_json().unwrap()
    }

    #[tokio::test]
    async fn selects_longest_mount() {
        let r = router();
        assert_eq!(by(&r, "/").await["by"], "home");
        assert_eq!(by(&r, "/api/health").await["by"], "health");
        assert_eq!(by(&r, "/api/users").await["by"], "users-list");
        assert_eq!(by(&r, "/api/users/").await["by"], "users-list");
        let one = by(&r, "/api/users/42").await;
        assert_eq!(one["by"], "users-one");
        assert_eq!(one["params"], serde_json::json!(["42"]));
    }

    #[tokio::test]
    async fn mount_prefix_is_segment_aligned() {
        let r = router();
        let resp = r.handle(Request::new(Method::GET, "/api/usersX")).await;
        assert_eq!(resp.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn unmatched_inside_mount_is_not_found() {
        let r = router();
        let resp = r.handle(Request::new(Method::GET, "/api/users/42/extra")).await;
        assert_eq!(resp.status, StatusCode::NOT_FOUND);
        assert_eq!(
            resp.body_json().unwrap(),
            serde_json::json!({ "error": "Route not found: GET /api/users/42/extra" })
        );
    }

    #[tokio::test]
    async fn empty_router_returns_not_found() {
        let resp = ApiRouter::new().handle(Request::new(Method::GET, "/")).await;
        assert_eq!(resp.status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn counts_routes_across_mounts() {
        let r = router();
        assert_eq!(r.route_count(), 4);
        let mounts: Vec<_> = r.mounts().collect();
        assert_eq!(mounts, vec![("system", "/"), ("users", "/api/users")]);
    }
}
