use common::{
    enums::OrderStatus,
    error::{AppError, Res},
};
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    dtos::order::{OrderCreateRequest, OrderFilter},
    models::order::Order,
};

fn not_found() -> AppError {
    AppError::NotFound("Pedido no encontrado".to_string())
}

pub async fn insert_order<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    data: OrderCreateRequest,
) -> Res<Order> {
    sqlx::query_as::<_, Order>(
        r#"
        INSERT INTO orders (company_id, customer_id, visit_id, vendor_id, amount, status, notes)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(data.company_id)
    .bind(data.customer_id)
    .bind(data.visit_id)
    .bind(data.vendor_id)
    .bind(data.amount)
    .bind(data.status)
    .bind(data.notes)
    .fetch_one(executor)
    .await
    .map_err(AppError::from)
}

pub async fn get_order<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    company_id: Uuid,
    order_id: Uuid,
) -> Res<Order> {
    sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1 AND company_id = $2")
        .bind(order_id)
        .bind(company_id)
        .fetch_optional(executor)
        .await?
        .ok_or_else(not_found)
}

/// Row-locks the order so concurrent transitions serialize.
pub async fn get_order_for_update<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    company_id: Uuid,
    order_id: Uuid,
) -> Res<Order> {
    sqlx::query_as::<_, Order>(
        "SELECT * FROM orders WHERE id = $1 AND company_id = $2 FOR UPDATE",
    )
    .bind(order_id)
    .bind(company_id)
    .fetch_optional(executor)
    .await?
    .ok_or_else(not_found)
}

pub async fn list_orders<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    filter: OrderFilter,
) -> Res<Vec<Order>> {
    sqlx::query_as::<_, Order>(
        r#"
        SELECT * FROM orders
        WHERE company_id = $1
          AND ($2::order_status IS NULL OR status = $2)
          AND ($3::uuid IS NULL OR customer_id = $3)
          AND ($4::uuid IS NULL OR vendor_id = $4)
        ORDER BY created_at DESC
        "#,
    )
    .bind(filter.company_id)
    .bind(filter.status)
    .bind(filter.customer_id)
    .bind(filter.vendor_id)
    .fetch_all(executor)
    .await
    .map_err(AppError::from)
}

pub async fn update_details<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    order_id: Uuid,
    amount: Option<i64>,
    notes: Option<String>,
) -> Res<Order> {
    sqlx::query_as::<_, Order>(
        r#"
        UPDATE orders SET
            amount = COALESCE($2, amount),
            notes = COALESCE($3, notes),
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(order_id)
    .bind(amount)
    .bind(notes)
    .fetch_one(executor)
    .await
    .map_err(AppError::from)
}

pub async fn set_status<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    order_id: Uuid,
    status: OrderStatus,
) -> Res<Order> {
    sqlx::query_as::<_, Order>(
        "UPDATE orders SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
    )
    .bind(order_id)
    .bind(status)
    .fetch_one(executor)
    .await
    .map_err(AppError::from)
}

pub async fn set_invoice<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    order_id: Uuid,
    invoice_number: &str,
    invoice_cufe: Option<&str>,
) -> Res<Order> {
    sqlx::query_as::<_, Order>(
        r#"
        UPDATE orders SET invoice_number = $2, invoice_cufe = $3, updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(order_id)
    .bind(invoice_number)
    .bind(invoice_cufe)
    .fetch_one(executor)
    .await
    .map_err(AppError::from)
}
