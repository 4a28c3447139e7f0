mod common;

use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn user_lifecycle() {
    let app = common::builtin();

    let created = app.post("/api/users", json!({ "name": "Ana", "email": "ana@example.com" })).await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.body["data"]["id"], 1);
    assert_eq!(created.body["data"]["email"], "ana@example.com");

    let dup = app.post("/api/users", json!({ "name": "Other", "email": "ANA@example.com" })).await;
    assert_eq!(dup.status, StatusCode::CONFLICT);

    let invalid = app.post("/api/users", json!({ "name": "Bob", "email": "not-an-email" })).await;
    assert_eq!(invalid.status, StatusCode::BAD_REQUEST);
    let missing = app.post("/api/users", json!({ "email": "bob@example.com" })).await;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);

    let renamed = app.put("/api/users/1", Some(json!({ "name": "Ana Maria" }))).await;
    assert_eq!(renamed.status, StatusCode::OK);
    assert_eq!(renamed.body["data"]["name"], "Ana Maria");
    assert_eq!(renamed.body["data"]["email"], "ana@example.com");

    let listed = app.get("/api/users").await;
    assert_eq!(listed.body["meta"]["count"], 1);

    assert_eq!(app.get("/api/users/abc").await.status, StatusCode::BAD_REQUEST);
    assert_eq!(app.delete("/api/users/1").await.status, StatusCode::NO_CONTENT);
    let gone = app.get("/api/users/1").await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
    assert!(gone.body["error"].as_str().unwrap().contains("users 1"));
}

#[tokio::test]
async fn malformed_json_is_bad_request() {
    let app = common::builtin();
    let req = axum::http::Request::builder()
        .method("POST")
        .uri("/api/products")
        .header("content-type", "application/json")
        .body(axum::body::Body::from("{not json"))
        .unwrap();
    let reply = app.send(req).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert!(reply.body["error"].is_string());
}

#[tokio::test]
async fn product_catalogue_and_stock() {
    let app = common::builtin();

    let keyboard = app
        .post("/api/products", json!({ "name": "Keyboard", "priceCents": 29999, "stock": 3 }))
        .await;
    assert_eq!(keyboard.status, StatusCode::CREATED);
    let mouse = app.post("/api/products", json!({ "name": "Mouse", "priceCents": 8990 })).await;
    assert_eq!(mouse.body["data"]["stock"], 0);

    let free = app.post("/api/products", json!({ "name": "Free", "priceCents": 0 })).await;
    assert_eq!(free.status, StatusCode::BAD_REQUEST);

    let available = app.get("/api/products/available").await;
    assert_eq!(available.status, StatusCode::OK);
    assert_eq!(available.body["meta"]["count"], 1);
    assert_eq!(available.body["data"][0]["name"], "Keyboard");

    let restocked = app.put("/api/products/2/stock", Some(json!({ "stock": 10 }))).await;
    assert_eq!(restocked.status, StatusCode::OK);
    assert_eq!(restocked.body["data"]["stock"], 10);
    assert_eq!(app.get("/api/products/available").await.body["meta"]["count"], 2);

    let negative = app.put("/api/products/2/stock", Some(json!({ "stock": -1 }))).await;
    assert_eq!(negative.status, StatusCode::BAD_REQUEST);

    assert_eq!(app.delete("/api/products/1").await.status, StatusCode::NO_CONTENT);
    assert_eq!(app.delete("/api/products/1").await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn order_lifecycle() {
    let app = common::builtin();

    let created = app
        .post(
            "/api/orders",
            json!({
                "userId": 7,
                "items": [{ "productId": 1, "quantity": 2, "unitPriceCents": 1500 }]
            }),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    let order = &created.body["data"];
    assert_eq!(order["status"], "PENDING");
    assert_eq!(order["totalCents"], 3000);
    assert_eq!(order["items"][0]["subtotalCents"], 3000);

    let added = app
        .post(
            "/api/orders/1/products",
            json!({ "productId": 2, "quantity": 1, "unitPriceCents": 999 }),
        )
        .await;
    assert_eq!(added.status, StatusCode::CREATED);
    assert_eq!(added.body["data"]["totalCents"], 3999);
    assert_eq!(added.body["data"]["items"].as_array().unwrap().len(), 2);

    let bad_item = app
        .post("/api/orders/1/products", json!({ "productId": 2, "quantity": 0, "unitPriceCents": 5 }))
        .await;
    assert_eq!(bad_item.status, StatusCode::BAD_REQUEST);

    let by_user = app.get("/api/orders/user/7").await;
    assert_eq!(by_user.body["meta"]["count"], 1);
    assert_eq!(app.get("/api/orders/user/8").await.body["meta"]["count"], 0);

    let paid = app.put("/api/orders/1/finalize", None).await;
    assert_eq!(paid.status, StatusCode::OK);
    assert_eq!(paid.body["data"]["status"], "PAID");

    let late = app
        .post("/api/orders/1/products", json!({ "productId": 3, "quantity": 1, "unitPriceCents": 100 }))
        .await;
    assert_eq!(late.status, StatusCode::BAD_REQUEST);

    let detail = app.get("/api/orders/1").await;
    assert_eq!(detail.body["data"]["totalCents"], 3999);

    assert_eq!(app.delete("/api/orders/1").await.status, StatusCode::NO_CONTENT);
    assert_eq!(app.get("/api/orders/1").await.status, StatusCode::NOT_FOUND);
    let db = app.get("/api/health/database").await;
    assert_eq!(db.body["data"]["order_items"], 0);
}

#[tokio::test]
async fn cancelled_order_cannot_be_finalized() {
    let app = common::builtin();
    app.post("/api/orders", json!({ "userId": 1 })).await;

    let unknown = app.put("/api/orders/1", Some(json!({ "status": "SHIPPED" }))).await;
    assert_eq!(unknown.status, StatusCode::BAD_REQUEST);

    let cancelled = app.put("/api/orders/1", Some(json!({ "status": "cancelled" }))).await;
    assert_eq!(cancelled.status, StatusCode::OK);
    assert_eq!(cancelled.body["data"]["status"], "CANCELLED");

    let finalize = app.put("/api/orders/1/finalize", None).await;
    assert_eq!(finalize.status, StatusCode::BAD_REQUEST);

    assert_eq!(app.put("/api/orders/99/finalize", None).await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn order_requires_user() {
    let app = common::builtin();
    let reply = app.post("/api/orders", json!({ "items": [] })).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert!(reply.body["error"].as_str().unwrap().contains("userId"));
}
