mod common;

use axum::http::{Method, StatusCode};
use microkernel_api::{builtin_plugins, AppConfig};
use serde_json::json;

#[tokio::test]
async fn home_lists_loaded_plugins() {
    let app = common::builtin();
    let reply = app.get("/").await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["pluginCount"], 3);
    let names: Vec<&str> = reply.body["plugins"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["users", "products", "orders"]);
    assert_eq!(reply.body["plugins"][0]["basePath"], "/api/users");
}

#[tokio::test]
async fn api_index_includes_plugin_groups() {
    let app = common::builtin();
    let reply = app.get("/api").await;
    assert_eq!(reply.status, StatusCode::OK);
    let paths: Vec<&str> = reply.body["endpoints"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["path"].as_str().unwrap())
        .collect();
    assert!(paths.contains(&"/api/docs-spec"));
    assert!(paths.contains(&"/api/orders"));
}

#[tokio::test]
async fn health_endpoints_report_status() {
    let app = common::builtin();
    let basic = app.get("/api/health").await;
    assert_eq!(basic.status, StatusCode::OK);
    assert_eq!(basic.body["status"], "UP");

    let detailed = app.get("/api/health/detailed").await;
    assert_eq!(detailed.body["status"], "UP");
    assert_eq!(detailed.body["components"]["store"]["kind"], "memory");
    assert_eq!(detailed.body["components"]["plugins"]["count"], 3);

    app.post("/api/users", json!({ "name": "Ana", "email": "ana@example.com" })).await;
    let db = app.get("/api/health/database").await;
    assert_eq!(db.body["status"], "HEALTHY");
    assert_eq!(db.body["data"], json!({ "users": 1, "products": 0, "orders": 0, "order_items": 0 }));
}

#[tokio::test]
async fn health_reflects_store_outage() {
    let app = common::builtin();
    app.store.set_available(false);
    let detailed = app.get("/api/health/detailed").await;
    assert_eq!(detailed.status, StatusCode::OK);
    assert_eq!(detailed.body["status"], "DEGRADED");
    assert_eq!(detailed.body["components"]["store"]["status"], "DOWN");

    let db = app.get("/api/health/database").await;
    assert_eq!(db.body["status"], "UNHEALTHY");
    assert_eq!(db.body["connected"], false);

    let users = app.get("/api/users").await;
    assert_eq!(users.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(users.body["error"].as_str().unwrap().contains("unavailable"));
}

#[tokio::test]
async fn docs_spec_merges_all_plugins() {
    let app = common::builtin();
    let reply = app.get("/api/docs-spec").await;
    assert_eq!(reply.status, StatusCode::OK);
    let doc = &reply.body;
    assert_eq!(doc["openapi"], "3.1.0");
    assert_eq!(doc["servers"][0]["url"], "http://localhost:8080");
    for path in ["/api/health", "/api/users/{id}", "/api/products/available", "/api/orders/{id}/finalize"] {
        assert!(doc["paths"].get(path).is_some(), "missing {}", path);
    }
    assert_eq!(doc["paths"]["/api/users"]["post"]["tags"], json!(["Users"]));
    for schema in ["ErrorBody", "User", "Product", "OrderDetail", "OrderStatus"] {
        assert!(doc["components"]["schemas"].get(schema).is_some(), "missing {}", schema);
    }
    let tags: Vec<&str> = doc["tags"].as_array().unwrap().iter().map(|t| t["name"].as_str().unwrap()).collect();
    assert_eq!(tags, vec!["System", "Users", "Products", "Orders"]);
    assert!(doc.get("x-omitted-fragments").is_none());
}

#[tokio::test]
async fn docs_listing_covers_every_route() {
    let app = common::builtin();
    let reply = app.get("/api/docs").await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["system"].as_array().unwrap().len(), 8);
    let products = &reply.body["plugins"][1];
    assert_eq!(products["name"], "products");
    let endpoints = products["endpoints"].as_array().unwrap();
    assert_eq!(endpoints.len(), 7);
    assert_eq!(endpoints[1]["path"], "/api/products/available");
    assert_eq!(endpoints[1]["summary"], "List products in stock");
}

#[tokio::test]
async fn swagger_ui_is_html() {
    let app = common::builtin();
    let reply = app.get("/api/swagger-ui").await;
    assert_eq!(reply.status, StatusCode::OK);
    assert!(reply.content_type.starts_with("text/html"));
    let page = String::from_utf8_lossy(&reply.raw);
    assert!(page.contains("/api/docs-spec"));
    assert!(page.contains(r##"dom_id: "#swagger-ui""##));
    assert!(page.trim_end().ends_with("</html>"));
}

#[tokio::test]
async fn documented_bodies_match_response_envelopes() {
    let app = common::builtin();
    app.post("/api/users", json!({ "name": "Ana", "email": "ana@example.com" })).await;
    let listed = app.get("/api/users").await.body;
    assert!(listed["data"].is_array());

    let doc = app.get("/api/docs-spec").await.body;
    let body = |path: &str, method: &str, status: &str| {
        doc["paths"][path][method]["responses"][status]["content"]["application/json"]["schema"].clone()
    };
    let list = body("/api/users", "get", "200");
    assert_eq!(list["properties"]["data"]["type"], "array");
    assert_eq!(list["properties"]["data"]["items"]["$ref"], "#/components/schemas/User");
    assert_eq!(list["properties"]["meta"]["$ref"], "#/components/schemas/MetaCount");
    assert!(doc["components"]["schemas"]["MetaCount"]["properties"].get("count").is_some());

    let created = body("/api/orders", "post", "201");
    assert_eq!(created["properties"]["data"]["$ref"], "#/components/schemas/OrderDetail");
    let available = body("/api/products/available", "get", "200");
    assert_eq!(available["properties"]["data"]["type"], "array");
}

#[tokio::test]
async fn unknown_route_is_structured_not_found() {
    let app = common::builtin();
    let reply = app.get("/api/nothing/here").await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert_eq!(reply.body, json!({ "error": "Route not found: GET /api/nothing/here" }));

    let wrong_method = app.call(Method::PATCH, "/api/users/1", None).await;
    assert_eq!(wrong_method.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let config = AppConfig {
        body_limit_bytes: 64,
        ..AppConfig::default()
    };
    let app = common::build(config, &builtin_plugins());
    let big = json!({ "name": "x".repeat(200), "email": "big@example.com" });
    let reply = app.post("/api/users", big).await;
    assert_eq!(reply.status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(reply.body["error"].as_str().unwrap().contains("64 bytes"));
}

#[tokio::test]
async fn disabled_plugin_is_absent() {
    let config = AppConfig {
        disabled_plugins: vec!["orders".into()],
        ..AppConfig::default()
    };
    let app = common::build(config, &builtin_plugins());
    assert_eq!(app.get("/api/orders").await.status, StatusCode::NOT_FOUND);
    let doc = app.get("/api/docs-spec").await.body;
    assert!(doc["paths"].get("/api/orders").is_none());
    assert_eq!(app.get("/").await.body["pluginCount"], 2);
}
