use std::sync::Arc;

use actix_web::{Responder, get, patch, post, web};
use common::{error::Res, http::Success};
use db::dtos::subscription::{PlanCreateRequest, PlanUpdateRequest};
use sqlx::PgPool;
use uuid::Uuid;

use crate::dtos::plan::{CreatePlanRequest, PlanQuery, UpdatePlanRequest};

#[get("")]
async fn get_plans(
    query: web::Query<PlanQuery>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    let plans = db::plan::list_plans(&***pool, query.active.unwrap_or(false)).await?;
    Success::ok(plans)
}

#[post("")]
async fn post_plan(
    req: web::Json<CreatePlanRequest>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    req.validate()?;
    let req = req.into_inner();
    let plan = db::plan::insert_plan(
        &***pool,
        PlanCreateRequest {
            name: req.name.trim().to_string(),
            description: req.description,
            price_monthly: req.price_monthly,
            max_vendors: req.max_vendors,
            max_customers: req.max_customers,
            max_delivery_people: req.max_delivery_people,
            dian_enabled: req.dian_enabled,
            reports_enabled: req.reports_enabled,
            api_access: req.api_access,
        },
    )
    .await?;
    log::info!("Plan {} created", plan.name);
    Success::created(plan)
}

#[patch("/{id}")]
async fn patch_plan(
    path: web::Path<Uuid>,
    req: web::Json<UpdatePlanRequest>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    req.validate()?;
    let req = req.into_inner();
    let plan = db::plan::update_plan(
        &***pool,
        path.into_inner(),
        PlanUpdateRequest {
            name: req.name.map(|n| n.trim().to_string()),
            description: req.description,
            price_monthly: req.price_monthly,
            max_vendors: req.max_vendors,
            max_customers: req.max_customers,
            max_delivery_people: req.max_delivery_people,
            dian_enabled: req.dian_enabled,
            reports_enabled: req.reports_enabled,
            api_access: req.api_access,
            active: req.active,
        },
    )
    .await?;
    Success::ok(plan)
}
