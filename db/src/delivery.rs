use chrono::{DateTime, Utc};
use common::{
    enums::DeliveryStatus,
    error::{AppError, Res},
};
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{dtos::order::DeliveryFilter, models::order::Delivery};

fn not_found() -> AppError {
    AppError::NotFound("Entrega no encontrada".to_string())
}

/// Creates the delivery of an order, or points the existing one at a new
/// delivery person and resets it to PENDING.
pub async fn upsert_for_order<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    company_id: Uuid,
    order_id: Uuid,
    delivery_person_id: Uuid,
) -> Res<Delivery> {
    sqlx::query_as::<_, Delivery>(
        r#"
        INSERT INTO deliveries (order_id, company_id, delivery_person_id)
        VALUES ($1, $2, $3)
        ON CONFLICT (order_id) DO UPDATE SET
            delivery_person_id = EXCLUDED.delivery_person_id,
            status = 'PENDING',
            notes = NULL,
            completed_at = NULL,
            updated_at = NOW()
        RETURNING *
        "#,
    )
    .bind(order_id)
    .bind(company_id)
    .bind(delivery_person_id)
    .fetch_one(executor)
    .await
    .map_err(AppError::from)
}

pub async fn get_for_order<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    order_id: Uuid,
) -> Res<Option<Delivery>> {
    sqlx::query_as::<_, Delivery>("SELECT * FROM deliveries WHERE order_id = $1")
        .bind(order_id)
        .fetch_optional(executor)
        .await
        .map_err(AppError::from)
}

pub async fn get_delivery_for_update<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    company_id: Uuid,
    delivery_id: Uuid,
) -> Res<Delivery> {
    sqlx::query_as::<_, Delivery>(
        "SELECT * FROM deliveries WHERE id = $1 AND company_id = $2 FOR UPDATE",
    )
    .bind(delivery_id)
    .bind(company_id)
    .fetch_optional(executor)
    .await?
    .ok_or_else(not_found)
}

pub async fn delete_pending_for_order<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    order_id: Uuid,
) -> Res<u64> {
    let result = sqlx::query("DELETE FROM deliveries WHERE order_id = $1 AND status = 'PENDING'")
        .bind(order_id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}

pub async fn list_deliveries<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    filter: DeliveryFilter,
) -> Res<Vec<Delivery>> {
    sqlx::query_as::<_, Delivery>(
        r#"
        SELECT * FROM deliveries
        WHERE company_id = $1
          AND ($2::uuid IS NULL OR delivery_person_id = $2)
          AND ($3::delivery_status IS NULL OR status = $3)
        ORDER BY created_at DESC
        "#,
    )
    .bind(filter.company_id)
    .bind(filter.delivery_person_id)
    .bind(filter.status)
    .fetch_all(executor)
    .await
    .map_err(AppError::from)
}

pub async fn complete_delivery<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    delivery_id: Uuid,
    status: DeliveryStatus,
    notes: Option<String>,
    completed_at: DateTime<Utc>,
) -> Res<Delivery> {
    sqlx::query_as::<_, Delivery>(
        r#"
        UPDATE deliveries SET
            status = $2,
            notes = COALESCE($3, notes),
            completed_at = $4,
            updated_at = NOW()
        WHERE id = $1 AND status = 'PENDING'
        RETURNING *
        "#,
    )
    .bind(delivery_id)
    .bind(status)
    .bind(notes)
    .bind(completed_at)
    .fetch_optional(executor)
    .await?
    .ok_or_else(|| AppError::BadRequest("La entrega ya fue finalizada".to_string()))
}
