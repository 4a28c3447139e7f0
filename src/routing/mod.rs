//! Declarative routing: patterns, route tables, dispatch and mounting.

pub mod dispatcher;
pub mod pattern;
pub mod router;
pub mod table;

pub use dispatcher::Dispatcher;
pub use pattern::{join_paths, split_segments, PathPattern, Segment};
pub use router::ApiRouter;
pub use table::{Handler, HandlerFuture, HandlerResult, Params, RouteEntry, RouteMatch, RouteTable};
