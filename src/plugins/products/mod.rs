//! Products plugin: catalogue and stock under `/api/products`.

pub mod handlers;
pub mod service;

pub use service::{NewProduct, Product, ProductService, StockUpdate, UpdateProduct};

use crate::docs::{schema_ref, OperationDoc};
use crate::error::AppError;
use crate::plugin::{PluginContext, PluginDescriptor};
use crate::routing::Handler;
use axum::http::Method;

pub const NAME: &str = "products";
pub const BASE_PATH: &str = "/api/products";

pub fn plugin(ctx: &PluginContext) -> Result<PluginDescriptor, AppError> {
    let svc = ProductService::new(ctx.store.clone());
    let not_found = || schema_ref("ErrorBody");
    Ok(PluginDescriptor::builder(NAME, BASE_PATH)
        .label("Products")
        .description("Product catalogue and stock")
        .tag_with_description("Products", "Catalogue entries and stock levels")
        .collection(service::COLLECTION)
        .schema_of::<Product>()
        .schema_of::<NewProduct>()
        .schema_of::<UpdateProduct>()
        .schema_of::<StockUpdate>()
        .route(
            Method::GET,
            "/",
            Handler::with_state(svc.clone(), handlers::list),
            OperationDoc::new("List products").response_many(200, "All products", "Product"),
        )
        .route(
            Method::GET,
            "/available",
            Handler::with_state(svc.clone(), handlers::available),
            OperationDoc::new("List products in stock").response_many(200, "Products with stock > 0", "Product"),
        )
        .route(
            Method::GET,
            "/{id}",
            Handler::with_state(svc.clone(), handlers::get),
            OperationDoc::new("Get a product")
                .path_param("id", "Product id")
                .response_one(200, "The product", "Product")
                .response_with(404, "No such product", not_found()),
        )
        .route(
            Method::POST,
            "/",
            Handler::with_state(svc.clone(), handlers::create),
            OperationDoc::new("Register a product")
                .description("priceCents must be positive; stock defaults to 0 and must not be negative.")
                .request("NewProduct")
                .response_one(201, "Created", "Product")
                .response_with(400, "Validation failed", schema_ref("ErrorBody")),
        )
        .route(
            Method::PUT,
            "/{id}",
            Handler::with_state(svc.clone(), handlers::update),
            OperationDoc::new("Update a product")
                .path_param("id", "Product id")
                .request("UpdateProduct")
                .response_one(200, "Updated", "Product")
                .response_with(404, "No such product", not_found()),
        )
        .route(
            Method::PUT,
            "/{id}/stock",
            Handler::with_state(svc.clone(), handlers::set_stock),
            OperationDoc::new("Set stock level")
                .path_param("id", "Product id")
                .request("StockUpdate")
                .response_one(200, "Updated", "Product")
                .response_with(404, "No such product", not_found()),
        )
        .route(
            Method::DELETE,
            "/{id}",
            Handler::with_state(svc, handlers::delete),
            OperationDoc::new("Delete a product")
                .path_param("id", "Product id")
                .response(204, "Deleted")
                .response_with(404, "No such product", not_found()),
        )
        .build())
}
