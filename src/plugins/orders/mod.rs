//! Orders plugin: orders, line items and status transitions under `/api/orders`.

pub mod handlers;
pub mod service;

pub use service::{NewOrder, NewOrderItem, Order, OrderDetail, OrderItem, OrderService, OrderStatus, StatusUpdate};

use crate::docs::{schema_ref, OperationDoc};
use crate::error::AppError;
use crate::plugin::{PluginContext, PluginDescriptor};
use crate::routing::Handler;
use axum::http::Method;

pub const NAME: &str = "orders";
pub const BASE_PATH: &str = "/api/orders";

pub fn plugin(ctx: &PluginContext) -> Result<PluginDescriptor, AppError> {
    let svc = OrderService::new(ctx.store.clone());
    let error = || schema_ref("ErrorBody");
    Ok(PluginDescriptor::builder(NAME, BASE_PATH)
        .label("Orders")
        .description("Orders, line items and payment status")
        .tag_with_description("Orders", "Customer orders")
        .collection(service::ORDERS)
        .collection(service::ORDER_ITEMS)
        .schema_of::<OrderStatus>()
        .schema_of::<Order>()
        .schema_of::<OrderItem>()
        .schema_of::<OrderDetail>()
        .schema_of::<NewOrder>()
        .schema_of::<NewOrderItem>()
        .schema_of::<StatusUpdate>()
        .route(
            Method::GET,
            "/",
            Handler::with_state(svc.clone(), handlers::list),
            OperationDoc::new("List orders").response_many(200, "All orders", "Order"),
        )
        .route(
            Method::GET,
            "/user/{userId}",
            Handler::with_state(svc.clone(), handlers::by_user),
            OperationDoc::new("List orders of a user")
                .path_param("userId", "User id")
                .response_many(200, "Orders placed by the user", "Order"),
        )
        .route(
            Method::GET,
            "/{id}",
            Handler::with_state(svc.clone(), handlers::get),
            OperationDoc::new("Get an order with its items")
                .path_param("id", "Order id")
                .response_one(200, "The order", "OrderDetail")
                .response_with(404, "No such order", error()),
        )
        .route(
            Method::POST,
            "/",
            Handler::with_state(svc.clone(), handlers::create),
            OperationDoc::new("Create an order")
                .description("Creates a PENDING order; items are optional.")
                .request("NewOrder")
                .response_one(201, "Created", "OrderDetail")
                .response_with(400, "Validation failed", error()),
        )
        .route(
            Method::POST,
            "/{id}/products",
            Handler::with_state(svc.clone(), handlers::add_item),
            OperationDoc::new("Add a product to an order")
                .path_param("id", "Order id")
                .request("NewOrderItem")
                .response_one(201, "Item added", "OrderDetail")
                .response_with(400, "Order is not pending or item is invalid", error())
                .response_with(404, "No such order", error()),
        )
        .route(
            Method::PUT,
            "/{id}",
            Handler::with_state(svc.clone(), handlers::set_status),
            OperationDoc::new("Change order status")
                .path_param("id", "Order id")
                .request("StatusUpdate")
                .response_one(200, "Updated", "Order")
                .response_with(400, "Unknown status", error())
                .response_with(404, "No such order", error()),
        )
        .route(
            Method::PUT,
            "/{id}/finalize",
            Handler::with_state(svc.clone(), handlers::finalize),
            OperationDoc::new("Finalize an order")
                .description("Marks the order PAID. Cancelled orders cannot be finalized.")
                .path_param("id", "Order id")
                .response_one(200, "Paid", "Order")
                .response_with(400, "Order is cancelled", error())
                .response_with(404, "No such order", error()),
        )
        .route(
            Method::DELETE,
            "/{id}",
            Handler::with_state(svc, handlers::delete),
            OperationDoc::new("Delete an order")
                .path_param("id", "Order id")
                .response(204, "Deleted")
                .response_with(404, "No such order", error()),
        )
        .build())
}
