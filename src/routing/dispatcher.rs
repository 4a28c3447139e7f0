//! Dispatcher: resolves a request against one route table and contains handler failures.

use crate::error::AppError;
use crate::request::Request;
use crate::response::Response;
use crate::routing::table::{HandlerResult, RouteTable};
use axum::http::StatusCode;
use std::sync::Arc;
use tokio::task::{AbortHandle, JoinError};

#[derive(Clone, Debug)]
pub struct Dispatcher {
    table: Arc<RouteTable>,
}

impl Dispatcher {
    pub fn new(table: Arc<RouteTable>) -> Self {
        Dispatcher { table }
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Resolve `req.path` and run the matching handler.
    pub async fn handle(&self, req: Request) -> Response {
        let path = req.path.clone();
        self.dispatch(req, &path).await
    }

    /// Resolve `local_path` (the request path relative to this table's mount point) and run the
    /// matching handler. Always produces exactly one response.
    pub async fn dispatch(&self, req: Request, local_path: &str) -> Response {
        let Some(matched) = self.table.resolve(&req.method, local_path) else {
            tracing::debug!(method = %req.method, path = %req.path, "route not found");
            return AppError::RouteNotFound {
                method: req.method,
                path: req.path,
            }
            .into();
        };
        let handler = matched.entry.handler.clone();
        let pattern = matched.entry.pattern.as_str().to_owned();
        let params = matched.params;
        let method = req.method.clone();
        let path = req.path.clone();

        match run_isolated(handler.call(req, params)).await {
            Ok(Ok(resp)) => resp,
            Ok(Err(err)) => {
                if err.is_handler_failure() {
                    tracing::error!(method = %method, path = %path, route = %pattern, error = %err, "handler failed");
                } else {
                    tracing::debug!(method = %method, path = %path, route = %pattern, error = %err, "request rejected");
                }
                err.into()
            }
            Err(aborted) => {
                let message = abort_message(aborted);
                tracing::error!(method = %method, path = %path, route = %pattern, error = %message, "handler aborted");
                Response::error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Internal server error: {}", message),
                )
            }
        }
    }
}

/// Aborts the handler task if the dispatching future is dropped before it finishes.
struct AbortOnDrop(AbortHandle);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

async fn run_isolated<F>(fut: F) -> Result<HandlerResult, JoinError>
where
    F: std::future::Future<Output = HandlerResult> + Send + 'static,
{
    let task = tokio::spawn(fut);
    let _guard = AbortOnDrop(task.abort_handle());
    task.await
}

fn abort_message(err: JoinError) -> String {
    if !err.is_panic() {
        return "handler was cancelled".into();
    }
    let payload = err.into_panic();
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "handler panicked".into()
    }
}
