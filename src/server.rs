//! axum transport: converts `http` requests into core requests and serves the kernel.

use crate::config::AppConfig;
use crate::error::AppError;
use crate::kernel::Kernel;
use crate::plugins::builtin_plugins;
use crate::request::Request;
use crate::response::Response;
use crate::routing::ApiRouter;
use crate::seed::seed_sample_data;
use crate::store::{connect_pg_store, MemoryStore, SharedStore};
use axum::http::header;
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// axum app whose every request is handled by the kernel's router.
pub fn app(kernel: &Kernel, body_limit: usize) -> Router {
    let router = kernel.router();
    Router::new()
        .fallback(move |req: axum::extract::Request| {
            let router = router.clone();
            async move { adapt(&router, req, body_limit).await }
        })
        .layer(TraceLayer::new_for_http())
}

async fn adapt(router: &ApiRouter, req: axum::extract::Request, body_limit: usize) -> Response {
    let (parts, body) = req.into_parts();
    let declared = parts
        .headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok());
    if declared.is_some_and(|len| len > body_limit) {
        return too_large(body_limit);
    }
    let bytes = match axum::body::to_bytes(body, body_limit).await {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::debug!(error = %err, "request body rejected");
            return too_large(body_limit);
        }
    };

    let mut core = Request::new(parts.method, parts.uri.path()).with_body(bytes);
    core.query = parts.uri.query().map(str::to_string);
    for (name, value) in &parts.headers {
        if let Ok(value) = value.to_str() {
            core = core.with_header(name.as_str(), value);
        }
    }
    router.handle(core).await
}

fn too_large(limit: usize) -> Response {
    AppError::PayloadTooLarge(format!("request body exceeds {} bytes", limit)).into()
}

/// `DATABASE_URL` selects PostgreSQL; otherwise records live in memory.
pub async fn open_store(config: &AppConfig) -> Result<SharedStore, AppError> {
    match &config.database_url {
        Some(url) => Ok(Arc::new(
            connect_pg_store(url, &config.schema, config.db_max_connections).await?,
        )),
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory store");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

/// Open the store, build the kernel with the built-in plugins and serve until ctrl-c.
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let config = Arc::new(config);
    let store = open_store(&config).await?;
    if config.seed_sample_data {
        seed_sample_data(store.clone()).await?;
    }
    let kernel = Kernel::build(config.clone(), store, &builtin_plugins())?;
    let app = app(&kernel, config.body_limit_bytes);

    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %listener.local_addr()?, workers = config.worker_threads, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn status_of_too_large() {
        assert_eq!(too_large(10).status, StatusCode::PAYLOAD_TOO_LARGE);
    }
}
