//! Merges system and plugin documentation fragments into one specification document.
//!
//! Paths and schemas are keyed maps: a later plugin replaces an earlier entry with the same key.
//! Tags are a case-insensitive ordered set: the first spelling seen is kept. A plugin whose
//! fragments fail validation contributes nothing and is reported in `omitted`.

use crate::plugin::PluginDescriptor;
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::collections::{BTreeMap, HashSet};

const HTTP_METHODS: &[&str] = &["get", "put", "post", "delete", "options", "head", "patch", "trace"];
const PATH_ITEM_KEYS: &[&str] = &["summary", "description", "parameters", "servers"];
const SCHEMA_KEYS: &[&str] = &["type", "$ref", "allOf", "oneOf", "anyOf", "properties", "enum", "items"];

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TagEntry {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl TagEntry {
    pub fn new(name: impl Into<String>, description: Option<String>) -> Self {
        TagEntry {
            name: name.into(),
            description,
        }
    }
}

/// A plugin whose contribution was left out of the document.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Omission {
    pub plugin: String,
    pub reason: String,
}

/// The fixed baseline the aggregator starts from.
#[derive(Clone, Debug, Default)]
pub struct DocFragments {
    pub paths: BTreeMap<String, Value>,
    pub schemas: BTreeMap<String, Value>,
    pub tags: Vec<TagEntry>,
}

#[derive(Clone, Debug, Default)]
pub struct AggregatedDocument {
    pub paths: BTreeMap<String, Value>,
    pub schemas: BTreeMap<String, Value>,
    pub tags: Vec<TagEntry>,
    pub omitted: Vec<Omission>,
}

/// Top-level metadata for the rendered document.
#[derive(Clone, Debug)]
pub struct DocInfo {
    pub title: String,
    pub version: String,
    pub description: String,
    pub server_url: String,
}

impl AggregatedDocument {
    pub fn tag_names(&self) -> Vec<&str> {
        self.tags.iter().map(|t| t.name.as_str()).collect()
    }

    fn add_tag(&mut self, seen: &mut HashSet<String>, tag: TagEntry) {
        if seen.insert(tag.name.to_lowercase()) {
            self.tags.push(tag);
        }
    }

    /// OpenAPI 3.1 rendering. Omitted plugins are listed under `x-omitted-fragments`.
    pub fn to_openapi(&self, info: &DocInfo) -> Value {
        let mut doc = Map::new();
        doc.insert("openapi".into(), json!("3.1.0"));
        doc.insert(
            "info".into(),
            json!({ "title": info.title, "version": info.version, "description": info.description }),
        );
        doc.insert("servers".into(), json!([{ "url": info.server_url }]));
        doc.insert("paths".into(), json!(self.paths));
        doc.insert("components".into(), json!({ "schemas": self.schemas }));
        doc.insert("tags".into(), json!(self.tags));
        if !self.omitted.is_empty() {
            doc.insert("x-omitted-fragments".into(), json!(self.omitted));
        }
        Value::Object(doc)
    }
}

#[derive(Clone, Debug, Default)]
pub struct DocumentationAggregator {
    base: DocFragments,
}

impl DocumentationAggregator {
    pub fn new(base: DocFragments) -> Self {
        DocumentationAggregator { base }
    }

    /// Pure function of `base` and the plugins, applied in iteration order.
    pub fn aggregate<'a, I>(&self, plugins: I) -> AggregatedDocument
    where
        I: IntoIterator<Item = &'a PluginDescriptor>,
    {
        let mut doc = AggregatedDocument {
            paths: self.base.paths.clone(),
            schemas: self.base.schemas.clone(),
            ..AggregatedDocument::default()
        };
        let mut seen_tags = HashSet::new();
        for tag in &self.base.tags {
            doc.add_tag(&mut seen_tags, tag.clone());
        }

        for plugin in plugins {
            if let Err(reason) = validate_plugin(plugin) {
                tracing::warn!(plugin = %plugin.name(), reason = %reason, "documentation fragments omitted");
                doc.omitted.push(Omission {
                    plugin: plugin.name().to_string(),
                    reason,
                });
                continue;
            }
            for (path, fragment) in plugin.openapi_paths() {
                doc.paths.insert(path.clone(), fragment.clone());
            }
            for (name, schema) in plugin.schemas() {
                doc.schemas.insert(name.clone(), schema.clone());
            }
            for tag in plugin.tags() {
                let description = plugin.tag_description(tag).map(str::to_string);
                doc.add_tag(&mut seen_tags, TagEntry::new(tag.trim(), description));
            }
        }
        doc
    }
}

/// All fragments of a plugin must be well-formed before any of them is merged.
pub fn validate_plugin(plugin: &PluginDescriptor) -> Result<(), String> {
    for (path, item) in plugin.openapi_paths() {
        validate_path_item(path, item)?;
    }
    for (name, schema) in plugin.schemas() {
        validate_schema(name, schema)?;
    }
    if plugin.tags().iter().any(|t| t.trim().is_empty()) {
        return Err("empty tag name".into());
    }
    Ok(())
}

fn validate_path_item(path: &str, item: &Value) -> Result<(), String> {
    if !path.starts_with('/') {
        return Err(format!("path '{}' must start with '/'", path));
    }
    let ops = item
        .as_object()
        .ok_or_else(|| format!("path '{}' is not an object", path))?;
    if ops.is_empty() {
        return Err(format!("path '{}' has no operations", path));
    }
    for (key, op) in ops {
        if PATH_ITEM_KEYS.contains(&key.as_str()) {
            continue;
        }
        if !HTTP_METHODS.contains(&key.as_str()) {
            return Err(format!("path '{}' has unknown key '{}'", path, key));
        }
        let summary = op.get("summary").and_then(Value::as_str).map(str::trim);
        if summary.map_or(true, str::is_empty) {
            return Err(format!("{} {} has no summary", key.to_uppercase(), path));
        }
        let responses = op.get("responses").and_then(Value::as_object);
        if responses.map_or(true, Map::is_empty) {
            return Err(format!("{} {} has no responses", key.to_uppercase(), path));
        }
    }
    Ok(())
}

fn validate_schema(name: &str, schema: &Value) -> Result<(), String> {
    let obj = schema
        .as_object()
        .ok_or_else(|| format!("schema '{}' is not an object", name))?;
    if SCHEMA_KEYS.iter().any(|k| obj.contains_key(*k)) {
        Ok(())
    } else {
        Err(format!("schema '{}' has no type", name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docs::OperationDoc;
    use crate::response::Response;
    use crate::routing::Handler;
    use axum::http::Method;

    fn ok() -> Handler {
        Handler::new(|_req, _params| async { Ok(Response::no_content()) })
    }

    fn base() -> DocFragments {
        DocFragments {
            paths: BTreeMap::from([(
                "/api/health".to_string(),
                json!({ "get": { "summary": "Health", "responses": { "200": { "description": "up" } } } }),
            )]),
            schemas: BTreeMap::new(),
            tags: vec![TagEntry::new("System", None)],
        }
    }

    fn op(summary: &str) -> Value {
        json!({ "get": { "summary": summary, "responses": { "200": { "description": "ok" } } } })
    }

    #[test]
    fn later_plugin_wins_path_and_tags_union() {
        let a = PluginDescriptor::builder("a", "/api/a")
            .tag("T1")
            .openapi_path("/x", op("from a"))
            .schema("Thing", json!({ "type": "object" }))
            .build();
        let b = PluginDescriptor::builder("b", "/api/b")
            .tag("T2")
            .openapi_path("/x", op("from b"))
            .build();
        let doc = DocumentationAggregator::new(base()).aggregate([&a, &b]);
        assert_eq!(doc.paths["/x"]["get"]["summary"], "from b");
        assert_eq!(doc.tag_names(), vec!["System", "T1", "T2"]);
        assert!(doc.paths.contains_key("/api/health"));
        assert!(doc.schemas.contains_key("Thing"));
        assert!(doc.omitted.is_empty());
    }

    #[test]
    fn tags_dedupe_case_insensitively_in_first_seen_order() {
        let a = PluginDescriptor::builder("a", "/api/a").tag("Resource").build();
        let b = PluginDescriptor::builder("b", "/api/b").tag("resource").tag("system").build();
        let doc = DocumentationAggregator::new(base()).aggregate([&a, &b]);
        assert_eq!(doc.tag_names(), vec!["System", "Resource"]);
    }

    #[test]
    fn malformed_fragment_omits_whole_plugin() {
        let bad = PluginDescriptor::builder("bad", "/api/bad")
            .tag("Bad")
            .openapi_path("/api/bad", json!({ "get": { "responses": { "200": { "description": "ok" } } } }))
            .openapi_path("/api/bad/ok", op("fine"))
            .build();
        let good = PluginDescriptor::builder("good", "/api/good")
            .tag("Good")
            .route(Method::GET, "/", ok(), OperationDoc::new("List").response(200, "ok"))
            .build();
        let doc = DocumentationAggregator::new(base()).aggregate([&bad, &good]);
        assert!(!doc.paths.contains_key("/api/bad/ok"));
        assert!(doc.paths.contains_key("/api/good"));
        assert_eq!(doc.tag_names(), vec!["System", "Good"]);
        assert_eq!(doc.omitted.len(), 1);
        assert_eq!(doc.omitted[0].plugin, "bad");
        assert!(doc.omitted[0].reason.contains("no summary"));
    }

    #[test]
    fn schema_without_type_is_rejected() {
        let p = PluginDescriptor::builder("p", "/api/p")
            .schema("Broken", json!({ "description": "nothing else" }))
            .build();
        assert!(validate_plugin(&p).unwrap_err().contains("Broken"));
        let empty_tag = PluginDescriptor::builder("q", "/api/q").tag("  ").build();
        assert_eq!(validate_plugin(&empty_tag).unwrap_err(), "empty tag name");
    }

    #[test]
    fn renders_openapi_with_omissions() {
        let bad = PluginDescriptor::builder("bad", "/api/bad").openapi_path("nope", op("x")).build();
        let doc = DocumentationAggregator::new(base()).aggregate([&bad]);
        let info = DocInfo {
            title: "t".into(),
            version: "1".into(),
            description: "d".into(),
            server_url: "http://localhost:8080".into(),
        };
        let rendered = doc.to_openapi(&info);
        assert_eq!(rendered["openapi"], "3.1.0");
        assert_eq!(rendered["servers"][0]["url"], "http://localhost:8080");
        assert_eq!(rendered["tags"], json!([{ "name": "System" }]));
        assert_eq!(rendered["x-omitted-fragments"][0]["plugin"], "bad");

        let clean = DocumentationAggregator::new(base()).aggregate(std::iter::empty()).to_openapi(&info);
        assert!(clean.get("x-omitted-fragments").is_none());
    }

    #[test]
    fn aggregation_is_repeatable() {
        let a = PluginDescriptor::builder("a", "/api/a").tag("A").openapi_path("/x", op("x")).build();
        let agg = DocumentationAggregator::new(base());
        let first = agg.aggregate([&a]);
        let second = agg.aggregate([&a]);
        assert_eq!(first.paths, second.paths);
        assert_eq!(first.tags, second.tags);
    }
}
