use common::error::{AppError, Res};
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    dtos::visit::{VisitCheckoutRequest, VisitCreateRequest, VisitFilter},
    models::visit::Visit,
};

fn not_found() -> AppError {
    AppError::NotFound("Visita no encontrada".to_string())
}

pub async fn insert_visit<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    data: VisitCreateRequest,
) -> Res<Visit> {
    sqlx::query_as::<_, Visit>(
        r#"
        INSERT INTO visits (company_id, customer_id, vendor_id, latitude, longitude)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(data.company_id)
    .bind(data.customer_id)
    .bind(data.vendor_id)
    .bind(data.latitude)
    .bind(data.longitude)
    .fetch_one(executor)
    .await
    .map_err(AppError::from)
}

pub async fn find_open_visit<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    vendor_id: Uuid,
    customer_id: Uuid,
) -> Res<Option<Visit>> {
    sqlx::query_as::<_, Visit>(
        r#"
        SELECT * FROM visits
        WHERE vendor_id = $1 AND customer_id = $2 AND check_out_at IS NULL
        ORDER BY check_in_at DESC
        LIMIT 1
        "#,
    )
    .bind(vendor_id)
    .bind(customer_id)
    .fetch_optional(executor)
    .await
    .map_err(AppError::from)
}

pub async fn get_visit<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    company_id: Uuid,
    visit_id: Uuid,
) -> Res<Visit> {
    sqlx::query_as::<_, Visit>("SELECT * FROM visits WHERE id = $1 AND company_id = $2")
        .bind(visit_id)
        .bind(company_id)
        .fetch_optional(executor)
        .await?
        .ok_or_else(not_found)
}

/// Row-locks the visit for the rest of the transaction.
pub async fn get_visit_for_update<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    company_id: Uuid,
    visit_id: Uuid,
) -> Res<Visit> {
    sqlx::query_as::<_, Visit>(
        "SELECT * FROM visits WHERE id = $1 AND company_id = $2 FOR UPDATE",
    )
    .bind(visit_id)
    .bind(company_id)
    .fetch_optional(executor)
    .await?
    .ok_or_else(not_found)
}

pub async fn check_out<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    visit_id: Uuid,
    data: VisitCheckoutRequest,
) -> Res<Visit> {
    sqlx::query_as::<_, Visit>(
        r#"
        UPDATE visits SET
            result = $2,
            order_amount = $3,
            notes = COALESCE($4, notes),
            check_out_at = $5
        WHERE id = $1 AND check_out_at IS NULL
        RETURNING *
        "#,
    )
    .bind(visit_id)
    .bind(data.result)
    .bind(data.order_amount)
    .bind(data.notes)
    .bind(data.check_out_at)
    .fetch_optional(executor)
    .await?
    .ok_or_else(|| AppError::BadRequest("La visita ya fue cerrada".to_string()))
}

pub async fn list_visits<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    filter: VisitFilter,
) -> Res<Vec<Visit>> {
    sqlx::query_as::<_, Visit>(
        r#"
        SELECT * FROM visits
        WHERE company_id = $1
          AND ($2::uuid IS NULL OR vendor_id = $2)
          AND ($3::uuid IS NULL OR customer_id = $3)
          AND ($4::timestamptz IS NULL OR check_in_at >= $4)
          AND ($5::timestamptz IS NULL OR check_in_at < $5)
        ORDER BY check_in_at DESC
        LIMIT $6
        "#,
    )
    .bind(filter.company_id)
    .bind(filter.vendor_id)
    .bind(filter.customer_id)
    .bind(filter.from)
    .bind(filter.to)
    .bind(filter.limit)
    .fetch_all(executor)
    .await
    .map_err(AppError::from)
}
