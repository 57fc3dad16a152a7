use std::sync::Arc;

use actix_web::{Responder, get, put, web};
use common::{enums::Role, env_config::Config, error::Res, http::Success, principal::Principal};
use db::dtos::dian::DianConfigUpsertRequest;
use sqlx::PgPool;

use crate::{
    dtos::config::{DianConfigRequest, DianConfigView, resolve_secret},
    services,
};

#[get("/config")]
async fn get_config(
    principal: web::ReqData<Principal>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    principal.require_role(&[Role::Admin])?;
    let config = db::dian::get_config(&***pool, principal.company_id()?).await?;
    Success::ok(DianConfigView::from(config))
}

#[put("/config")]
async fn put_config(
    principal: web::ReqData<Principal>,
    req: web::Json<DianConfigRequest>,
    pool: web::Data<Arc<PgPool>>,
    config: web::Data<Arc<Config>>,
) -> Res<impl Responder> {
    principal.require_role(&[Role::Admin])?;
    req.validate()?;
    let company_id = principal.company_id()?;
    services::invoice::ensure_plan_allows_dian(&pool, company_id).await?;

    let req = req.into_inner();
    let stored = db::dian::get_config(&***pool, company_id).await?;
    let client_secret = resolve_secret(
        req.client_secret,
        stored.as_ref().map(|c| c.client_secret.as_str()),
        "client_secret",
    )?;
    let password = resolve_secret(
        req.password,
        stored.as_ref().map(|c| c.password.as_str()),
        "password",
    )?;

    let saved = db::dian::upsert_config(
        &***pool,
        DianConfigUpsertRequest {
            company_id,
            enabled: req.enabled,
            api_url: req
                .api_url
                .or(stored.map(|c| c.api_url))
                .unwrap_or_else(|| config.invoicing_api_url.clone()),
            client_id: req.client_id.trim().to_string(),
            client_secret,
            username: req.username.trim().to_string(),
            password,
            numbering_range_id: req.numbering_range_id,
        },
    )
    .await?;
    log::info!("DIAN configuration of company {} saved (enabled={})", company_id, saved.enabled);
    Success::ok(DianConfigView::from(Some(saved)))
}
