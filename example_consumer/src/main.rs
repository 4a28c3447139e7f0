//! Example consumer: a separate crate that registers its own plugin next to the built-ins.
//!
//! Run from repo root: `cargo run -p example-consumer`

use axum::http::Method;
use microkernel_api::docs::{schema_ref, OperationDoc};
use microkernel_api::store::Collection;
use microkernel_api::{
    app, builtin_plugins, open_store, success_many, success_one, AppConfig, AppError, Handler, HandlerResult, Kernel,
    Params, PluginContext, PluginDescriptor, PluginFactory, Request,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;

#[derive(Clone, Debug, Serialize, Deserialize)]
struct Note {
    text: String,
}

type Notes = Collection<Note>;

async fn list_notes(notes: Notes, _req: Request, _params: Params) -> HandlerResult {
    success_many(notes.list().await?)
}

async fn add_note(notes: Notes, req: Request, _params: Params) -> HandlerResult {
    let note: Note = req.json()?;
    if note.text.trim().is_empty() {
        return Err(AppError::Validation("text is required".into()));
    }
    success_one(notes.insert(note).await?)
}

fn notes_plugin(ctx: &PluginContext) -> Result<PluginDescriptor, AppError> {
    let notes: Notes = Collection::new(ctx.store.clone(), "notes");
    let note_schema = serde_json::json!({
        "type": "object",
        "required": ["text"],
        "properties": { "id": { "type": "integer" }, "text": { "type": "string" } }
    });
    Ok(PluginDescriptor::builder("notes", "/api/notes")
        .label("Notes")
        .description("Free-form notes kept by the consumer")
        .tag("Notes")
        .collection("notes")
        .schema("Note", note_schema)
        .route(
            Method::GET,
            "/",
            Handler::with_state(notes.clone(), list_notes),
            OperationDoc::new("List notes").response_many(200, "All notes", "Note"),
        )
        .route(
            Method::POST,
            "/",
            Handler::with_state(notes, add_note),
            OperationDoc::new("Add a note")
                .request("Note")
                .response_one(201, "Created", "Note")
                .response_with(400, "Validation failed", schema_ref("ErrorBody")),
        )
        .build())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("microkernel_api=info,example_consumer=info")),
        )
        .init();

    let config = Arc::new(AppConfig::from_env()?);
    let store = open_store(&config).await?;
    let mut factories = builtin_plugins();
    factories.push(PluginFactory::new("notes", notes_plugin));
    let kernel = Kernel::build(config.clone(), store, &factories)?;

    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("Example consumer listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app(&kernel, config.body_limit_bytes)).await?;
    Ok(())
}
