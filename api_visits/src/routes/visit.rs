use std::sync::Arc;

use actix_web::{Responder, get, post, web};
use common::{enums::Role, error::Res, http::Success, principal::Principal};
use db::dtos::visit::VisitFilter;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    dtos::visit::{CheckInRequest, CheckOutRequest, VisitQuery},
    services,
};

#[post("/check-in")]
async fn post_check_in(
    principal: web::ReqData<Principal>,
    req: web::Json<CheckInRequest>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    principal.require_role(&[Role::Vendor, Role::Admin])?;
    req.validate()?;
    let visit = services::visit::check_in(&pool, &principal, req.into_inner()).await?;
    Success::created(visit)
}

#[post("/{id}/check-out")]
async fn post_check_out(
    principal: web::ReqData<Principal>,
    path: web::Path<Uuid>,
    req: web::Json<CheckOutRequest>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    principal.require_role(&[Role::Vendor, Role::Admin])?;
    let result =
        services::visit::check_out(&pool, &principal, path.into_inner(), req.into_inner()).await?;
    Success::ok(result)
}

#[get("")]
async fn get_visits(
    principal: web::ReqData<Principal>,
    query: web::Query<VisitQuery>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    query.validate()?;
    let visits = db::visit::list_visits(
        &***pool,
        VisitFilter {
            company_id: principal.company_id()?,
            vendor_id: services::visit::visible_vendor(&principal, query.vendor_id),
            customer_id: query.customer_id,
            from: query.from,
            to: query.to,
            limit: query.limit(),
        },
    )
    .await?;
    Success::ok(visits)
}

#[get("/{id}")]
async fn get_visit(
    principal: web::ReqData<Principal>,
    path: web::Path<Uuid>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    let visit = services::visit::get_visit(&pool, &principal, path.into_inner()).await?;
    Success::ok(visit)
}
