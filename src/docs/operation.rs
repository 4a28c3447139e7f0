//! Builder for one documented operation, rendered as an OpenAPI operation object.

use serde_json::{json, Map, Value};
use utoipa::ToSchema;

/// `#/components/schemas/<name>` reference object.
pub fn schema_ref(name: &str) -> Value {
    json!({ "$ref": format!("#/components/schemas/{}", name) })
}

/// Schema of a `success_one` body: `{"data": <name>}`.
pub fn data_one(name: &str) -> Value {
    json!({
        "type": "object",
        "required": ["data"],
        "properties": { "data": schema_ref(name) }
    })
}

/// Schema of a `success_many` body: `{"data": [<name>], "meta": {"count": n}}`.
pub fn data_many(name: &str) -> Value {
    json!({
        "type": "object",
        "required": ["data", "meta"],
        "properties": {
            "data": { "type": "array", "items": schema_ref(name) },
            "meta": schema_ref("MetaCount")
        }
    })
}

/// The JSON schema utoipa derives for `T`, with its component name.
pub fn schema_of<T: ToSchema>() -> (String, Value) {
    let schema = serde_json::to_value(<T as utoipa::PartialSchema>::schema()).unwrap_or(Value::Null);
    (T::name().into_owned(), schema)
}

#[derive(Clone, Debug)]
struct ParamDoc {
    name: String,
    location: &'static str,
    required: bool,
    description: String,
    schema: Value,
}

#[derive(Clone, Debug)]
struct ResponseDoc {
    status: u16,
    description: String,
    schema: Option<Value>,
}

#[derive(Clone, Debug)]
pub struct OperationDoc {
    summary: String,
    description: Option<String>,
    tags: Vec<String>,
    params: Vec<ParamDoc>,
    request_body: Option<Value>,
    responses: Vec<ResponseDoc>,
}

impl OperationDoc {
    pub fn new(summary: impl Into<String>) -> Self {
        OperationDoc {
            summary: summary.into(),
            description: None,
            tags: Vec::new(),
            params: Vec::new(),
            request_body: None,
            responses: Vec::new(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Integer path parameter, e.g. `{id}`.
    pub fn path_param(self, name: &str, description: &str) -> Self {
        self.path_param_with(name, description, json!({ "type": "integer", "format": "int64" }))
    }

    pub fn path_string_param(self, name: &str, description: &str) -> Self {
        self.path_param_with(name, description, json!({ "type": "string" }))
    }

    pub fn path_param_with(mut self, name: &str, description: &str, schema: Value) -> Self {
        self.params.push(ParamDoc {
            name: name.into(),
            location: "path",
            required: true,
            description: description.into(),
            schema,
        });
        self
    }

    /// JSON request body referencing a component schema.
    pub fn request(mut self, schema_name: &str) -> Self {
        self.request_body = Some(schema_ref(schema_name));
        self
    }

    pub fn response(mut self, status: u16, description: &str) -> Self {
        self.responses.push(ResponseDoc {
            status,
            description: description.into(),
            schema: None,
        });
        self
    }

    pub fn response_with(mut self, status: u16, description: &str, schema: Value) -> Self {
        self.responses.push(ResponseDoc {
            status,
            description: description.into(),
            schema: Some(schema),
        });
        self
    }

    /// Response wrapped the way `success_one` / `success_one_ok` wraps it.
    pub fn response_one(self, status: u16, description: &str, schema_name: &str) -> Self {
        self.response_with(status, description, data_one(schema_name))
    }

    /// Response wrapped the way `success_many` wraps it.
    pub fn response_many(self, status: u16, description: &str, schema_name: &str) -> Self {
        self.response_with(status, description, data_many(schema_name))
    }

    pub fn has_tags(&self) -> bool {
        !self.tags.is_empty()
    }

    pub fn to_value(&self) -> Value {
        let mut op = Map::new();
        op.insert("summary".into(), json!(self.summary));
        if let Some(description) = &self.description {
            op.insert("description".into(), json!(description));
        }
        if !self.tags.is_empty() {
            op.insert("tags".into(), json!(self.tags));
        }
        if !self.params.is_empty() {
            let params: Vec<Value> = self
                .params
                .iter()
                .map(|p| {
                    json!({
                        "name": p.name,
                        "in": p.location,
                        "required": p.required,
                        "description": p.description,
                        "schema": p.schema,
                    })
                })
                .collect();
            op.insert("parameters".into(), Value::Array(params));
        }
        if let Some(schema) = &self.request_body {
            op.insert(
                "requestBody".into(),
                json!({ "required": true, "content": { "application/json": { "schema": schema } } }),
            );
        }
        let mut responses = Map::new();
        for r in &self.responses {
            let mut body = Map::new();
            body.insert("description".into(), json!(r.description));
            if let Some(schema) = &r.schema {
                body.insert("content".into(), json!({ "application/json": { "schema": schema } }));
            }
            responses.insert(r.status.to_string(), Value::Object(body));
        }
        op.insert("responses".into(), Value::Object(responses));
        Value::Object(op)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_operation_object() {
        let op = OperationDoc::new("Get user by id")
            .tag("Users")
            .path_param("id", "User id")
            .response_with(200, "The user", schema_ref("User"))
            .response(404, "No such user")
            .to_value();
        assert_eq!(op["summary"], "Get user by id");
        assert_eq!(op["tags"], json!(["Users"]));
        assert_eq!(op["parameters"][0]["in"], "path");
        assert_eq!(
            op["responses"]["200"]["content"]["application/json"]["schema"]["$ref"],
            "#/components/schemas/User"
        );
        assert_eq!(op["responses"]["404"], json!({ "description": "No such user" }));
        assert!(op.get("requestBody").is_none());
    }

    #[test]
    fn envelope_responses_wrap_data() {
        let op = OperationDoc::new("List users")
            .response_many(200, "All users", "User")
            .response_one(201, "Created", "User")
            .to_value();
        let many = &op["responses"]["200"]["content"]["application/json"]["schema"];
        assert_eq!(many["properties"]["data"]["type"], "array");
        assert_eq!(many["properties"]["data"]["items"]["$ref"], "#/components/schemas/User");
        assert_eq!(many["properties"]["meta"]["$ref"], "#/components/schemas/MetaCount");
        let one = &op["responses"]["201"]["content"]["application/json"]["schema"];
        assert_eq!(one["properties"]["data"]["$ref"], "#/components/schemas/User");
    }

    #[test]
    fn path_param_schema_is_selectable() {
        let op = OperationDoc::new("Get note")
            .path_string_param("slug", "Note slug")
            .path_param("id", "Note id")
            .response(200, "ok")
            .to_value();
        assert_eq!(op["parameters"][0]["schema"], json!({ "type": "string" }));
        assert_eq!(op["parameters"][1]["schema"]["format"], "int64");
    }
}
