//! Capability record a plugin hands to the kernel: mount path, routes and documentation fragments.

use crate::docs::{schema_of, OperationDoc};
use crate::routing::{join_paths, split_segments, Handler, RouteTable};
use axum::http::Method;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use utoipa::ToSchema;

/// Read-only once built. Fragments are plain JSON so the aggregator can validate them.
#[derive(Clone, Debug)]
pub struct PluginDescriptor {
    name: String,
    base_path: String,
    label: String,
    description: String,
    routes: Arc<RouteTable>,
    schemas: BTreeMap<String, Value>,
    tags: Vec<String>,
    tag_descriptions: BTreeMap<String, String>,
    openapi_paths: BTreeMap<String, Value>,
    collections: Vec<String>,
}

impl PluginDescriptor {
    pub fn builder(name: impl Into<String>, base_path: impl Into<String>) -> PluginBuilder {
        let name = name.into();
        PluginBuilder {
            descriptor: PluginDescriptor {
                label: name.clone(),
                name,
                base_path: base_path.into(),
                description: String::new(),
                routes: Arc::new(RouteTable::new()),
                schemas: BTreeMap::new(),
                tags: Vec::new(),
                tag_descriptions: BTreeMap::new(),
                openapi_paths: BTreeMap::new(),
                collections: Vec::new(),
            },
            routes: RouteTable::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Base path as given by the plugin. See [`PluginDescriptor::mount_path`] for the normalized form.
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// `/`-prefixed base path without a trailing slash.
    pub fn mount_path(&self) -> String {
        join_paths(&self.base_path, "")
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn routes(&self) -> &Arc<RouteTable> {
        &self.routes
    }

    pub fn schemas(&self) -> &BTreeMap<String, Value> {
        &self.schemas
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn tag_description(&self, tag: &str) -> Option<&str> {
        self.tag_descriptions.get(tag).map(String::as_str)
    }

    /// Path fragments keyed by absolute path (base path joined with the route pattern).
    pub fn openapi_paths(&self) -> &BTreeMap<String, Value> {
        &self.openapi_paths
    }

    /// Storage collections this plugin owns.
    pub fn collections(&self) -> &[String] {
        &self.collections
    }

    /// Summary of the documented operation for a registered route.
    pub fn operation_summary(&self, method: &Method, pattern: &str) -> Option<&str> {
        let key = method.as_str().to_ascii_lowercase();
        self.openapi_paths
            .get(&join_paths(&self.base_path, pattern))?
            .get(&key)?
            .get("summary")?
            .as_str()
    }

    /// A plugin may not mount at the root; the kernel rejects descriptors where this is false.
    pub fn mounts_below_root(&self) -> bool {
        !split_segments(&self.base_path).is_empty()
    }
}

pub struct PluginBuilder {
    descriptor: PluginDescriptor,
    routes: RouteTable,
}

impl PluginBuilder {
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.descriptor.label = label.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.descriptor.description = description.into();
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.descriptor.tags.push(tag.into());
        self
    }

    pub fn tag_with_description(mut self, tag: impl Into<String>, description: impl Into<String>) -> Self {
        let tag = tag.into();
        self.descriptor.tag_descriptions.insert(tag.clone(), description.into());
        self.descriptor.tags.push(tag);
        self
    }

    pub fn collection(mut self, name: impl Into<String>) -> Self {
        self.descriptor.collections.push(name.into());
        self
    }

    pub fn schema(mut self, name: impl Into<String>, schema: Value) -> Self {
        self.descriptor.schemas.insert(name.into(), schema);
        self
    }

    /// Register the utoipa-derived schema of `T` under its component name.
    pub fn schema_of<T: ToSchema>(self) -> Self {
        let (name, schema) = schema_of::<T>();
        self.schema(name, schema)
    }

    /// Register a route and document it. Operations without a tag get the plugin's first tag.
    pub fn route(mut self, method: Method, pattern: &str, handler: Handler, doc: OperationDoc) -> Self {
        let doc = match self.descriptor.tags.first() {
            Some(tag) if !doc.has_tags() => doc.tag(tag.clone()),
            _ => doc,
        };
        let path = join_paths(&self.descriptor.base_path, pattern);
        let key = method.as_str().to_ascii_lowercase();
        let fragment = self
            .descriptor
            .openapi_paths
            .entry(path)
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(ops) = fragment {
            ops.insert(key, doc.to_value());
        }
        self.routes.register(method, pattern, handler);
        self
    }

    /// Register a route without documentation.
    pub fn undocumented(mut self, method: Method, pattern: &str, handler: Handler) -> Self {
        self.routes.register(method, pattern, handler);
        self
    }

    /// Insert a raw path fragment, replacing any fragment already held for `path`.
    pub fn openapi_path(mut self, path: impl Into<String>, fragment: Value) -> Self {
        self.descriptor.openapi_paths.insert(path.into(), fragment);
        self
    }

    pub fn build(self) -> PluginDescriptor {
        let PluginBuilder { mut descriptor, routes } = self;
        descriptor.routes = Arc::new(routes);
        descriptor
    }
}
