use super::service::{NewProduct, ProductService, StockUpdate, UpdateProduct};
use crate::request::Request;
use crate::response::{success_many, success_one, success_one_ok, Response};
use crate::routing::{HandlerResult, Params};

pub async fn list(svc: ProductService, _req: Request, _params: Params) -> HandlerResult {
    success_many(svc.list().await?)
}

pub async fn available(svc: ProductService, _req: Request, _params: Params) -> HandlerResult {
    success_many(svc.available().await?)
}

pub async fn get(svc: ProductService, _req: Request, params: Params) -> HandlerResult {
    success_one_ok(svc.get(params.parse("id")?).await?)
}

pub async fn create(svc: ProductService, req: Request, _params: Params) -> HandlerResult {
    let input: NewProduct = req.json()?;
    success_one(svc.create(input).await?)
}

pub async fn update(svc: ProductService, req: Request, params: Params) -> HandlerResult {
    let id = params.parse("id")?;
    let input: UpdateProduct = req.json()?;
    success_one_ok(svc.update(id, input).await?)
}

pub async fn set_stock(svc: ProductService, req: Request, params: Params) -> HandlerResult {
    let id = params.parse("id")?;
    let input: StockUpdate = req.json()?;
    success_one_ok(svc.set_stock(id, input).await?)
}

pub async fn delete(svc: ProductService, _req: Request, params: Params) -> HandlerResult {
    svc.delete(params.parse("id")?).await?;
    Ok(Response::no_content())
}
