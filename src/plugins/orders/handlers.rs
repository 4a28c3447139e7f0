use super::service::{NewOrder, NewOrderItem, OrderService, StatusUpdate};
use crate::request::Request;
use crate::response::{success_many, success_one, success_one_ok, Response};
use crate::routing::{HandlerResult, Params};

pub async fn list(svc: OrderService, _req: Request, _params: Params) -> HandlerResult {
    success_many(svc.list().await?)
}

pub async fn get(svc: OrderService, _req: Request, params: Params) -> HandlerResult {
    success_one_ok(svc.get(params.parse("id")?).await?)
}

pub async fn by_user(svc: OrderService, _req: Request, params: Params) -> HandlerResult {
    success_many(svc.by_user(params.parse("userId")?).await?)
}

pub async fn create(svc: OrderService, req: Request, _params: Params) -> HandlerResult {
    let input: NewOrder = req.json()?;
    success_one(svc.create(input).await?)
}

pub async fn add_item(svc: OrderService, req: Request, params: Params) -> HandlerResult {
    let id = params.parse("id")?;
    let input: NewOrderItem = req.json()?;
    success_one(svc.add_item(id, input).await?)
}

pub async fn set_status(svc: OrderService, req: Request, params: Params) -> HandlerResult {
    let id = params.parse("id")?;
    let input: StatusUpdate = req.json()?;
    success_one_ok(svc.set_status(id, input).await?)
}

pub async fn finalize(svc: OrderService, _req: Request, params: Params) -> HandlerResult {
    success_one_ok(svc.finalize(params.parse("id")?).await?)
}

pub async fn delete(svc: OrderService, _req: Request, params: Params) -> HandlerResult {
    svc.delete(params.parse("id")?).await?;
    Ok(Response::no_content())
}
