use std::sync::Arc;

use actix_web::{Responder, delete, get, patch, post, web};
use common::{enums::Role, error::Res, http::Success, principal::Principal};
use db::dtos::visit::ScheduledVisitFilter;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    dtos::scheduled::{
        CreateScheduledVisitRequest, ScheduledVisitQuery, UpdateScheduledVisitRequest,
    },
    services,
};

/// `pending=true` hides completed schedules.
#[get("")]
async fn get_scheduled_visits(
    principal: web::ReqData<Principal>,
    query: web::Query<ScheduledVisitQuery>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    let visits = db::scheduled_visit::list_scheduled_visits(
        &***pool,
        ScheduledVisitFilter {
            company_id: principal.company_id()?,
            vendor_id: services::visit::visible_vendor(&principal, query.vendor_id),
            pending_only: query.pending.unwrap_or(false),
        },
    )
    .await?;
    Success::ok(visits)
}

#[post("")]
async fn post_scheduled_visit(
    principal: web::ReqData<Principal>,
    req: web::Json<CreateScheduledVisitRequest>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    principal.require_role(&[Role::Admin, Role::Vendor])?;
    let visit = services::visit::schedule(&pool, &principal, req.into_inner()).await?;
    Success::created(visit)
}

#[patch("/{id}")]
async fn patch_scheduled_visit(
    principal: web::ReqData<Principal>,
    path: web::Path<Uuid>,
    req: web::Json<UpdateScheduledVisitRequest>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    principal.require_role(&[Role::Admin, Role::Vendor])?;
    let visit =
        services::visit::reschedule(&pool, &principal, path.into_inner(), req.into_inner()).await?;
    Success::ok(visit)
}

#[delete("/{id}")]
async fn delete_scheduled_visit(
    principal: web::ReqData<Principal>,
    path: web::Path<Uuid>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    principal.require_role(&[Role::Admin, Role::Vendor])?;
    services::visit::unschedule(&pool, &principal, path.into_inner()).await?;
    Success::no_content()
}
