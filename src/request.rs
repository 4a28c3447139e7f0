//! Transport-neutral request handed to the dispatcher.

use crate::error::AppError;
use axum::body::Bytes;
use axum::http::Method;
use serde::de::DeserializeOwned;
use std::collections::HashMap;

#[derive(Clone, Debug)]
pub struct Request {
    pub method: Method,
    /// Full request path as received, without the query string.
    pub path: String,
    pub query: Option<String>,
    /// Header names are stored lowercase.
    pub headers: HashMap<String, String>,
    pub body: Bytes,
}

impl Request {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Request {
            method,
            path: path.into(),
            query: None,
            headers: HashMap::new(),
            body: Bytes::new(),
        }
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Serialize `value` as the body and set a JSON content type.
    pub fn with_json<T: serde::Serialize>(mut self, value: &T) -> Result<Self, AppError> {
        self.body = serde_json::to_vec(value)?.into();
        self.headers
            .insert("content-type".into(), crate::response::CONTENT_TYPE_JSON.into());
        Ok(self)
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    /// Decode the body as JSON. An empty or malformed body is a bad request.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, AppError> {
        if self.body.is_empty() {
            return Err(AppError::BadRequest("request body is required".into()));
        }
        serde_json::from_slice(&self.body).map_err(|e| AppError::BadRequest(format!("invalid JSON body: {}", e)))
    }
}
