use std::sync::Arc;

use actix_web::{Responder, get, web};
use common::{enums::Role, error::Res, http::Success, principal::Principal};
use sqlx::PgPool;

use crate::{
    dtos::stats::{DeliveryStatsQuery, VendorStatsQuery},
    services,
};

#[get("/dashboard")]
async fn get_dashboard(
    principal: web::ReqData<Principal>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    principal.require_role(&[Role::Admin])?;
    let stats = services::stats::dashboard(&pool, principal.company_id()?).await?;
    Success::ok(stats)
}

#[get("/vendor")]
async fn get_vendor_stats(
    principal: web::ReqData<Principal>,
    query: web::Query<VendorStatsQuery>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    let vendor_id = services::stats::subject(&principal, query.vendor_id, Role::Vendor)?;
    let stats = services::stats::vendor(&pool, principal.company_id()?, vendor_id).await?;
    Success::ok(stats)
}

#[get("/delivery")]
async fn get_delivery_stats(
    principal: web::ReqData<Principal>,
    query: web::Query<DeliveryStatsQuery>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    let person_id =
        services::stats::subject(&principal, query.delivery_person_id, Role::Delivery)?;
    let stats = services::stats::delivery(&pool, principal.company_id()?, person_id).await?;
    Success::ok(stats)
}
