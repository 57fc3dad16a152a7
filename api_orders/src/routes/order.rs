use std::sync::Arc;

use actix_web::{Responder, get, patch, post, web};
use common::{enums::Role, env_config::Config, error::Res, http::Success, principal::Principal};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    dtos::order::{
        ApproveOrderRequest, AssignOrderRequest, CreateOrderRequest, OrderQuery,
        UpdateOrderRequest,
    },
    services,
};

#[get("")]
async fn get_orders(
    principal: web::ReqData<Principal>,
    query: web::Query<OrderQuery>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    principal.require_role(&[Role::Admin, Role::Vendor])?;
    let orders = services::order::list(&pool, &principal, query.into_inner()).await?;
    Success::ok(orders)
}

/// Order with its delivery, if any.
#[get("/{id}")]
async fn get_order(
    principal: web::ReqData<Principal>,
    path: web::Path<Uuid>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    let order = services::order::detail(&pool, &principal, path.into_inner()).await?;
    Success::ok(order)
}

#[post("")]
async fn post_order(
    principal: web::ReqData<Principal>,
    req: web::Json<CreateOrderRequest>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    principal.require_role(&[Role::Admin])?;
    req.validate()?;
    let order = services::order::create(&pool, principal.company_id()?, req.into_inner()).await?;
    Success::created(order)
}

#[patch("/{id}")]
async fn patch_order(
    principal: web::ReqData<Principal>,
    path: web::Path<Uuid>,
    req: web::Json<UpdateOrderRequest>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    principal.require_role(&[Role::Admin])?;
    req.validate()?;
    let order = services::order::update(
        &pool,
        principal.company_id()?,
        path.into_inner(),
        req.into_inner(),
    )
    .await?;
    Success::ok(order)
}

#[post("/{id}/approve")]
async fn post_approve(
    principal: web::ReqData<Principal>,
    path: web::Path<Uuid>,
    req: Option<web::Json<ApproveOrderRequest>>,
    pool: web::Data<Arc<PgPool>>,
    http: web::Data<reqwest::Client>,
) -> Res<impl Responder> {
    principal.require_role(&[Role::Admin])?;
    let invoice = req.map(|r| r.invoice).unwrap_or(false);
    let order = services::order::approve(
        &pool,
        &http,
        principal.company_id()?,
        path.into_inner(),
        invoice,
    )
    .await?;
    Success::ok(order)
}

#[post("/{id}/assign")]
async fn post_assign(
    principal: web::ReqData<Principal>,
    path: web::Path<Uuid>,
    req: web::Json<AssignOrderRequest>,
    pool: web::Data<Arc<PgPool>>,
    http: web::Data<reqwest::Client>,
    config: web::Data<Arc<Config>>,
) -> Res<impl Responder> {
    principal.require_role(&[Role::Admin])?;
    let order = services::order::assign(
        &pool,
        &http,
        &config.push_api_url,
        principal.company_id()?,
        path.into_inner(),
        req.delivery_person_id,
    )
    .await?;
    Success::ok(order)
}

#[post("/{id}/unassign")]
async fn post_unassign(
    principal: web::ReqData<Principal>,
    path: web::Path<Uuid>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    principal.require_role(&[Role::Admin])?;
    let order =
        services::order::unassign(&pool, principal.company_id()?, path.into_inner()).await?;
    Success::ok(order)
}
