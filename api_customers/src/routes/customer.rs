use std::sync::Arc;

use actix_web::{Responder, delete, get, patch, post, web};
use common::{enums::Role, error::Res, http::Success, principal::Principal};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    dtos::customer::{CreateCustomerRequest, CustomerQuery, NearbyParams, UpdateCustomerRequest},
    services,
};

#[get("")]
async fn get_customers(
    principal: web::ReqData<Principal>,
    query: web::Query<CustomerQuery>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    let customers = services::customer::list(&pool, &principal, query.into_inner()).await?;
    Success::ok(customers)
}

/// Customers around a point, nearest first.
#[get("/nearby")]
async fn get_nearby(
    principal: web::ReqData<Principal>,
    query: web::Query<NearbyParams>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    query.validate()?;
    let customers = services::customer::nearby(&pool, &principal, query.into_inner()).await?;
    Success::ok(customers)
}

#[get("/{id}")]
async fn get_customer(
    principal: web::ReqData<Principal>,
    path: web::Path<Uuid>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    let detail = services::customer::detail(&pool, &principal, path.into_inner()).await?;
    Success::ok(detail)
}

#[post("")]
async fn post_customer(
    principal: web::ReqData<Principal>,
    req: web::Json<CreateCustomerRequest>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    principal.require_role(&[Role::Admin, Role::Vendor])?;
    req.validate()?;
    let customer = services::customer::create(&pool, &principal, req.into_inner()).await?;
    Success::created(customer)
}

#[patch("/{id}")]
async fn patch_customer(
    principal: web::ReqData<Principal>,
    path: web::Path<Uuid>,
    req: web::Json<UpdateCustomerRequest>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    principal.require_role(&[Role::Admin, Role::Vendor])?;
    req.validate()?;
    let customer =
        services::customer::update(&pool, &principal, path.into_inner(), req.into_inner()).await?;
    Success::ok(customer)
}

/// Soft delete. Visits and orders keep pointing at the customer.
#[delete("/{id}")]
async fn delete_customer(
    principal: web::ReqData<Principal>,
    path: web::Path<Uuid>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    principal.require_role(&[Role::Admin])?;
    db::customer::deactivate_customer(&***pool, principal.company_id()?, path.into_inner()).await?;
    Success::no_content()
}
