//! Microkernel API: a self-describing REST service composed from independently packaged plugins.

pub mod config;
pub mod docs;
pub mod error;
pub mod handlers;
pub mod kernel;
pub mod plugin;
pub mod plugins;
pub mod request;
pub mod response;
pub mod routes;
pub mod routing;
pub mod seed;
pub mod server;
pub mod state;
pub mod store;

pub use config::{AppConfig, FailurePolicy};
pub use docs::{AggregatedDocument, DocumentationAggregator, OperationDoc};
pub use error::{AppError, ConfigError};
pub use kernel::Kernel;
pub use plugin::{PluginContext, PluginDescriptor, PluginFactory, PluginRegistry};
pub use plugins::builtin_plugins;
pub use request::Request;
pub use response::{success_many, success_one, success_one_ok, Response};
pub use routing::{ApiRouter, Dispatcher, Handler, HandlerResult, Params, RouteTable};
pub use server::{app, open_store, run};
pub use state::AppState;
pub use store::{MemoryStore, SharedStore, Store};
