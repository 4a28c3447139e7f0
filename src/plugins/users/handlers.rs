use super::service::{NewUser, UpdateUser, UserService};
use crate::request::Request;
use crate::response::{success_many, success_one, success_one_ok, Response};
use crate::routing::{HandlerResult, Params};

pub async fn list(svc: UserService, _req: Request, _params: Params) -> HandlerResult {
    success_many(svc.list().await?)
}

pub async fn get(svc: UserService, _req: Request, params: Params) -> HandlerResult {
    success_one_ok(svc.get(params.parse("id")?).await?)
}

pub async fn create(svc: UserService, req: Request, _params: Params) -> HandlerResult {
    let input: NewUser = req.json()?;
    success_one(svc.create(input).await?)
}

pub async fn update(svc: UserService, req: Request, params: Params) -> HandlerResult {
    let id = params.parse("id")?;
    let input: UpdateUser = req.json()?;
    success_one_ok(svc.update(id, input).await?)
}

pub async fn delete(svc: UserService, _req: Request, params: Params) -> HandlerResult {
    svc.delete(params.parse("id")?).await?;
    Ok(Response::no_content())
}
