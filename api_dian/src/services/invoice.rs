use common::error::{AppError, Res};
use db::models::{customer::Customer, dian::DianConfiguration, order::Order};
use sqlx::PgPool;
use uuid::Uuid;

use crate::client::{InvoicingClient, IssuedInvoice};

/// Electronic invoicing is a plan feature.
pub async fn ensure_plan_allows_dian(pool: &PgPool, company_id: Uuid) -> Res<()> {
    let plan = db::plan::get_company_plan(pool, company_id).await?;
    if plan.is_some_and(|p| p.dian_enabled) {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Tu plan no incluye facturación electrónica DIAN".to_string(),
        ))
    }
}

/// Configuration of a tenant ready to invoice: plan allows it and the
/// company enabled it.
pub async fn active_config(pool: &PgPool, company_id: Uuid) -> Res<DianConfiguration> {
    ensure_plan_allows_dian(pool, company_id).await?;
    db::dian::get_config(pool, company_id)
        .await?
        .filter(|config| config.enabled)
        .ok_or_else(|| {
            AppError::BadRequest(
                "La facturación electrónica no está configurada o está deshabilitada".to_string(),
            )
        })
}

pub async fn issue(
    pool: &PgPool,
    http: &reqwest::Client,
    order: &Order,
    customer: &Customer,
) -> Res<IssuedInvoice> {
    let config = active_config(pool, order.company_id).await?;
    let invoice = InvoicingClient::new(http, &config)
        .create_invoice(order, customer)
        .await?;
    log::info!("Order {} invoiced as {}", order.id, invoice.number);
    Ok(invoice)
}
