//! Transport-neutral response type and standard envelope helpers.

use crate::error::{AppError, ErrorBody};
use axum::body::Bytes;
use axum::http::{header, StatusCode};
use serde::Serialize;
use utoipa::ToSchema;

pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const CONTENT_TYPE_HTML: &str = "text/html; charset=utf-8";

/// Response handed back to the transport: status, body bytes and content type.
#[derive(Clone, Debug, PartialEq)]
pub struct Response {
    pub status: StatusCode,
    pub body: Bytes,
    pub content_type: String,
}

impl Response {
    pub fn new(status: StatusCode, body: impl Into<Bytes>, content_type: impl Into<String>) -> Self {
        Response {
            status,
            body: body.into(),
            content_type: content_type.into(),
        }
    }

    pub fn json<T: Serialize>(status: StatusCode, value: &T) -> Result<Self, AppError> {
        let body = serde_json::to_vec(value)?;
        Ok(Response::new(status, body, CONTENT_TYPE_JSON))
    }

    pub fn html(status: StatusCode, body: impl Into<String>) -> Self {
        Response::new(status, body.into(), CONTENT_TYPE_HTML)
    }

    /// Structured error response in the `{"error": "<message>"}` shape.
    pub fn error(status: StatusCode, message: impl Into<String>) -> Self {
        let body = ErrorBody {
            error: message.into(),
        };
        let bytes = serde_json::to_vec(&body).unwrap_or_else(|_| br#"{"error":"internal error"}"#.to_vec());
        Response::new(status, bytes, CONTENT_TYPE_JSON)
    }

    pub fn no_content() -> Self {
        Response::new(StatusCode::NO_CONTENT, Bytes::new(), CONTENT_TYPE_JSON)
    }

    /// Parse the body as JSON. Used by callers that inspect responses (tests, health probes).
    pub fn body_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

impl axum::response::IntoResponse for Response {
    fn into_response(self) -> axum::response::Response {
        (self.status, [(header::CONTENT_TYPE, self.content_type)], self.body).into_response()
    }
}

#[derive(Serialize)]
pub struct SuccessOne<T> {
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<serde_json::Value>,
}

#[derive(Serialize)]
pub struct SuccessMany<T> {
    pub data: Vec<T>,
    pub meta: MetaCount,
}

/// `meta` of a list response.
#[derive(Serialize, ToSchema)]
pub struct MetaCount {
    pub count: u64,
}

pub fn success_one<T: Serialize>(data: T) -> Result<Response, AppError> {
    Response::json(StatusCode::CREATED, &SuccessOne { data, meta: None })
}

pub fn success_one_ok<T: Serialize>(data: T) -> Result<Response, AppError> {
    Response::json(StatusCode::OK, &SuccessOne { data, meta: None })
}

pub fn success_many<T: Serialize>(data: Vec<T>) -> Result<Response, AppError> {
    let count = data.len() as u64;
    Response::json(
        StatusCode::OK,
        &SuccessMany {
            data,
            meta: MetaCount { count },
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_response_has_standard_shape() {
        let resp = Response::error(StatusCode::NOT_FOUND, "Route not found: GET /x");
        assert_eq!(resp.content_type, CONTENT_TYPE_JSON);
        assert_eq!(
            resp.body_json().unwrap(),
            serde_json::json!({ "error": "Route not found: GET /x" })
        );
    }

    #[test]
    fn success_many_counts_items() {
        let resp = success_many(vec![1, 2, 3]).unwrap();
        assert_eq!(resp.status, StatusCode::OK);
        assert_eq!(
            resp.body_json().unwrap(),
            serde_json::json!({ "data": [1, 2, 3], "meta": { "count": 3 } })
        );
    }
}
