use std::sync::Arc;

use actix_web::{Responder, get, patch, put, web};
use common::{
    enums::SubscriptionStatus,
    error::{AppError, Res},
    http::Success,
};
use db::dtos::{
    company::CompanyUpdateRequest,
    subscription::{SubscriptionCreateRequest, SubscriptionUpdateRequest},
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    dtos::{
        company::{CompanyDetail, UpdateCompanyRequest},
        subscription::SubscriptionUpsertRequest,
    },
    services,
};

#[get("")]
async fn get_companies(pool: web::Data<Arc<PgPool>>) -> Res<impl Responder> {
    let companies = db::company::list_companies(&***pool).await?;
    Success::ok(companies)
}

#[get("/{id}")]
async fn get_company(
    path: web::Path<Uuid>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    let company = db::company::get_company_by_id(&***pool, path.into_inner()).await?;
    let subscription = services::subscription::get_view(&pool, company.id).await?;
    Success::ok(CompanyDetail {
        company,
        subscription,
    })
}

/// Superadmins use this mostly to suspend or reactivate a tenant.
#[patch("/{id}")]
async fn patch_company(
    path: web::Path<Uuid>,
    req: web::Json<UpdateCompanyRequest>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    let req = req.into_inner();
    let company = db::company::update_company(
        &***pool,
        path.into_inner(),
        CompanyUpdateRequest {
            name: req.name,
            nit: req.nit,
            phone: req.phone,
            address: req.address,
            city: req.city,
            active: req.active,
        },
    )
    .await?;
    log::info!("Company {} updated (active={})", company.id, company.active);
    Success::ok(company)
}

#[put("/{id}/subscription")]
async fn put_subscription(
    path: web::Path<Uuid>,
    req: web::Json<SubscriptionUpsertRequest>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    let company_id = path.into_inner();
    let req = req.into_inner();
    let mut tx = pool.begin().await?;

    db::company::get_company_by_id(&mut *tx, company_id).await?;
    if let Some(plan_id) = req.plan_id {
        db::plan::get_plan(&mut *tx, plan_id).await?;
    }

    let updated = db::subscription::update_by_company(
        &mut *tx,
        company_id,
        SubscriptionUpdateRequest {
            plan_id: req.plan_id,
            status: req.status,
            trial_ends_at: req.trial_ends_at,
            current_period_end: req.current_period_end,
        },
    )
    .await?;

    let subscription = match updated {
        Some(subscription) => subscription,
        None => {
            let (Some(plan_id), Some(current_period_end)) = (req.plan_id, req.current_period_end)
            else {
                return Err(AppError::BadRequest(
                    "plan_id y current_period_end son obligatorios para crear la suscripción"
                        .to_string(),
                ));
            };
            db::subscription::insert_subscription(
                &mut *tx,
                SubscriptionCreateRequest {
                    company_id,
                    plan_id,
                    status: req.status.unwrap_or(SubscriptionStatus::Active),
                    trial_ends_at: req.trial_ends_at,
                    current_period_end,
                },
            )
            .await?
        }
    };

    tx.commit().await?;
    log::info!(
        "Subscription of company {} set to {:?} until {}",
        company_id,
        subscription.status,
        subscription.current_period_end
    );
    Success::ok(subscription)
}
