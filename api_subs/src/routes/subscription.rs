use std::sync::Arc;

use actix_web::{Responder, get, web};
use common::{error::Res, http::Success, principal::Principal};
use sqlx::PgPool;

use crate::services;

/// Current plan, status, read-only flag, trial days and plan usage.
/// Stays available while the tenant is read-only.
#[get("")]
async fn get_current(
    principal: web::ReqData<Principal>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    let view = services::subscription::get_view(&pool, principal.company_id()?).await?;
    Success::ok(view)
}
