use std::sync::Arc;

use actix_web::{Responder, get, post, web};
use common::{
    enums::Role, error::Res, http::Success, principal::Principal, validation::require_email,
};
use sqlx::PgPool;

use crate::{
    client::InvoicingClient,
    dtos::config::{BillEmailRequest, BillsQuery},
    services,
};

#[get("/bills")]
async fn get_bills(
    principal: web::ReqData<Principal>,
    query: web::Query<BillsQuery>,
    pool: web::Data<Arc<PgPool>>,
    http: web::Data<reqwest::Client>,
) -> Res<impl Responder> {
    principal.require_role(&[Role::Admin])?;
    let config = services::invoice::active_config(&pool, principal.company_id()?).await?;
    let bills = InvoicingClient::new(&http, &config)
        .list_bills(query.page.unwrap_or(1).max(1))
        .await?;
    Success::ok(bills)
}

#[post("/bills/{number}/email")]
async fn post_bill_email(
    principal: web::ReqData<Principal>,
    path: web::Path<String>,
    req: web::Json<BillEmailRequest>,
    pool: web::Data<Arc<PgPool>>,
    http: web::Data<reqwest::Client>,
) -> Res<impl Responder> {
    principal.require_role(&[Role::Admin])?;
    require_email(&req.email)?;
    let config = services::invoice::active_config(&pool, principal.company_id()?).await?;
    InvoicingClient::new(&http, &config)
        .send_bill_email(&path, req.email.trim())
        .await?;
    Success::no_content()
}
