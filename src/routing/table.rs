//! Route table: ordered (method, pattern) -> handler entries with first-match-wins resolution.

use crate::error::AppError;
use crate::request::Request;
use crate::response::Response;
use crate::routing::pattern::{split_segments, PathPattern};
use axum::http::Method;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::str::FromStr;
use std::sync::Arc;

pub type HandlerResult = Result<Response, AppError>;
pub type HandlerFuture = Pin<Box<dyn Future<Output = HandlerResult> + Send + 'static>>;

/// A pre-bound, typed handler. Cloning shares the same underlying closure.
#[derive(Clone)]
pub struct Handler(Arc<dyn Fn(Request, Params) -> HandlerFuture + Send + Sync>);

impl Handler {
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(Request, Params) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        Handler(Arc::new(move |req, params| Box::pin(f(req, params))))
    }

    /// Bind `state` at registration time; each call receives its own clone.
    pub fn with_state<S, F, Fut>(state: S, f: F) -> Self
    where
        S: Clone + Send + Sync + 'static,
        F: Fn(S, Request, Params) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        Handler::new(move |req, params| f(state.clone(), req, params))
    }

    pub fn call(&self, req: Request, params: Params) -> HandlerFuture {
        (self.0)(req, params)
    }

    /// True when both handles refer to the same registered closure.
    pub fn ptr_eq(a: &Handler, b: &Handler) -> bool {
        std::ptr::eq(Arc::as_ptr(&a.0) as *const (), Arc::as_ptr(&b.0) as *const ())
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Handler(..)")
    }
}

/// Parameter values extracted for one request, positionally matching the pattern's `{name}` segments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Params {
    names: Arc<[String]>,
    values: Vec<String>,
}

impl Default for Params {
    fn default() -> Self {
        Params::new(Arc::from(Vec::new()), Vec::new())
    }
}

impl Params {
    pub fn new(names: Arc<[String]>, values: Vec<String>) -> Self {
        Params { names, values }
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.values.get(index).map(String::as_str)
    }

    pub fn by_name(&self, name: &str) -> Option<&str> {
        self.names
            .iter()
            .position(|n| n == name)
            .and_then(|i| self.get(i))
    }

    /// Parse a named parameter. A value that does not parse is the client's fault (400).
    pub fn parse<T: FromStr>(&self, name: &str) -> Result<T, AppError> {
        let raw = self
            .by_name(name)
            .ok_or_else(|| AppError::Internal(format!("route has no parameter '{}'", name)))?;
        raw.parse()
            .map_err(|_| AppError::BadRequest(format!("invalid path parameter {}: '{}'", name, raw)))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[derive(Clone, Debug)]
pub struct RouteEntry {
    pub method: Method,
    pub pattern: PathPattern,
    pub handler: Handler,
}

pub struct RouteMatch<'a> {
    pub entry: &'a RouteEntry,
    pub params: Params,
}

impl RouteMatch<'_> {
    pub fn handler(&self) -> &Handler {
        &self.entry.handler
    }
}

/// Entries are tried in registration order; there is no specificity ranking, and a later
/// entry with the same method and pattern as an earlier one is never reached.
#[derive(Clone, Debug, Default)]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
}

impl RouteTable {
    pub fn new() -> Self {
        RouteTable::default()
    }

    pub fn register(&mut self, method: Method, pattern: &str, handler: Handler) -> &mut Self {
        self.entries.push(RouteEntry {
            method,
            pattern: PathPattern::parse(pattern),
            handler,
        });
        self
    }

    pub fn route(mut self, method: Method, pattern: &str, handler: Handler) -> Self {
        self.register(method, pattern, handler);
        self
    }

    pub fn get(self, pattern: &str, handler: Handler) -> Self {
        self.route(Method::GET, pattern, handler)
    }

    pub fn post(self, pattern: &str, handler: Handler) -> Self {
        self.route(Method::POST, pattern, handler)
    }

    pub fn put(self, pattern: &str, handler: Handler) -> Self {
        self.route(Method::PUT, pattern, handler)
    }

    pub fn patch(self, pattern: &str, handler: Handler) -> Self {
        self.route(Method::PATCH, pattern, handler)
    }

    pub fn delete(self, pattern: &str, handler: Handler) -> Self {
        self.route(Method::DELETE, pattern, handler)
    }

    pub fn resolve(&self, method: &Method, path: &str) -> Option<RouteMatch<'_>> {
        let segments = split_segments(path);
        self.entries
            .iter()
            .find(|entry| entry.method == *method && entry.pattern.matches(&segments))
            .map(|entry| RouteMatch {
                entry,
                params: Params::new(entry.pattern.param_names().clone(), entry.pattern.extract(&segments)),
            })
    }

    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn labelled(label: &'static str) -> Handler {
        Handler::new(move |_req, _params| async move { Ok(Response::html(StatusCode::OK, label)) })
    }

    #[test]
    fn resolves_parameter_route() {
        let h = labelled("user");
        let table = RouteTable::new().get("/api/users/{id}", h.clone());
        let m = table.resolve(&Method::GET, "/api/users/42").expect("route should match");
        assert!(Handler::ptr_eq(m.handler(), &h));
        assert_eq!(m.params.values(), &["42".to_string()]);
        assert_eq!(m.params.by_name("id"), Some("42"));
    }

    #[test]
    fn segment_count_must_match() {
        let table = RouteTable::new().get("/api/users", labelled("list"));
        assert!(table.resolve(&Method::GET, "/api/users/42").is_none());
        assert!(table.resolve(&Method::GET, "/api").is_none());
        assert!(table.resolve(&Method::GET, "/api/users").is_some());
    }

    #[test]
    fn method_must_match() {
        let table = RouteTable::new().get("/things", labelled("get"));
        assert!(table.resolve(&Method::POST, "/things").is_none());
    }

    #[test]
    fn unmatched_request_resolves_to_none() {
        let table = RouteTable::new()
            .get("/a", labelled("a"))
            .post("/b/{id}", labelled("b"));
        assert!(table.resolve(&Method::GET, "/c").is_none());
        assert!(table.resolve(&Method::GET, "/b/1").is_none());
        assert!(RouteTable::new().resolve(&Method::GET, "/").is_none());
    }

    // Known contract: duplicate registrations are accepted and the later one is dead.
    #[test]
    fn duplicate_registration_first_wins() {
        let first = labelled("first");
        let second = labelled("second");
        let mut table = RouteTable::new();
        table
            .register(Method::GET, "/dup/{id}", first.clone())
            .register(Method::GET, "/dup/{id}", second.clone());
        assert_eq!(table.len(), 2);
        for path in ["/dup/1", "/dup/abc", "/dup/zzz/"] {
            let m = table.resolve(&Method::GET, path).unwrap();
            assert!(Handler::ptr_eq(m.handler(), &first));
            assert!(!Handler::ptr_eq(m.handler(), &second));
        }
    }

    #[test]
    fn registration_order_beats_specificity() {
        let param = labelled("param");
        let literal = labelled("literal");
        let table = RouteTable::new()
            .get("/products/{id}", param.clone())
            .get("/products/available", literal.clone());
        let m = table.resolve(&Method::GET, "/products/available").unwrap();
        assert!(Handler::ptr_eq(m.handler(), &param));
        assert_eq!(m.params.values(), &["available".to_string()]);
    }

    #[test]
    fn multiple_params_extracted_in_order() {
        let table = RouteTable::new().put("/{a}/mid/{b}/{c}", labelled("x"));
        let m = table.resolve(&Method::PUT, "/1/mid/2/3").unwrap();
        assert_eq!(m.params.values(), &["1".to_string(), "2".to_string(), "3".to_string()]);
    }

    #[test]
    fn root_pattern_matches_empty_relative_path() {
        let table = RouteTable::new().get("/", labelled("root"));
        assert!(table.resolve(&Method::GET, "").is_some());
        assert!(table.resolve(&Method::GET, "/").is_some());
    }

    #[test]
    fn params_parse_reports_bad_request() {
        let table = RouteTable::new().get("/n/{id}", labelled("n"));
        let ok = table.resolve(&Method::GET, "/n/12").unwrap();
        assert_eq!(ok.params.parse::<i64>("id").unwrap(), 12);
        let bad = table.resolve(&Method::GET, "/n/twelve").unwrap();
        assert!(matches!(bad.params.parse::<i64>("id"), Err(AppError::BadRequest(_))));
        assert!(matches!(bad.params.parse::<i64>("other"), Err(AppError::Internal(_))));
    }

    #[tokio::test]
    async fn with_state_binds_state_per_call() {
        let h = Handler::with_state(Arc::new("bound".to_string()), |state: Arc<String>, _req, _params| async move {
            Ok(Response::html(StatusCode::OK, state.as_str().to_owned()))
        });
        let resp = h.call(Request::new(Method::GET, "/"), Params::default()).await.unwrap();
        assert_eq!(&resp.body[..], b"bound");
    }
}
