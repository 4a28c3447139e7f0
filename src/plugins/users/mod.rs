//! Users plugin: registration and lookup under `/api/users`.

pub mod handlers;
pub mod service;

pub use service::{NewUser, UpdateUser, User, UserService};

use crate::docs::{schema_ref, OperationDoc};
use crate::error::AppError;
use crate::plugin::{PluginContext, PluginDescriptor};
use crate::routing::Handler;
use axum::http::Method;

pub const NAME: &str = "users";
pub const BASE_PATH: &str = "/api/users";

pub fn plugin(ctx: &PluginContext) -> Result<PluginDescriptor, AppError> {
    let svc = UserService::new(ctx.store.clone());
    Ok(PluginDescriptor::builder(NAME, BASE_PATH)
        .label("Users")
        .description("User registration and lookup")
        .tag_with_description("Users", "User accounts")
        .collection(service::COLLECTION)
        .schema_of::<User>()
        .schema_of::<NewUser>()
        .schema_of::<UpdateUser>()
        .route(
            Method::GET,
            "/",
            Handler::with_state(svc.clone(), handlers::list),
            OperationDoc::new("List users").response_many(200, "All users", "User"),
        )
        .route(
            Method::GET,
            "/{id}",
            Handler::with_state(svc.clone(), handlers::get),
            OperationDoc::new("Get a user")
                .path_param("id", "User id")
                .response_one(200, "The user", "User")
                .response_with(404, "No such user", schema_ref("ErrorBody")),
        )
        .route(
            Method::POST,
            "/",
            Handler::with_state(svc.clone(), handlers::create),
            OperationDoc::new("Register a user")
                .description("Name and email are required; email must be unique.")
                .request("NewUser")
                .response_one(201, "Created", "User")
                .response_with(400, "Validation failed", schema_ref("ErrorBody"))
                .response_with(409, "Email already registered", schema_ref("ErrorBody")),
        )
        .route(
            Method::PUT,
            "/{id}",
            Handler::with_state(svc.clone(), handlers::update),
            OperationDoc::new("Update a user")
                .path_param("id", "User id")
                .request("UpdateUser")
                .response_one(200, "Updated", "User")
                .response_with(404, "No such user", schema_ref("ErrorBody")),
        )
        .route(
            Method::DELETE,
            "/{id}",
            Handler::with_state(svc, handlers::delete),
            OperationDoc::new("Delete a user")
                .path_param("id", "User id")
                .response(204, "Deleted")
                .response_with(404, "No such user", schema_ref("ErrorBody")),
        )
        .build())
}
