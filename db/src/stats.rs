use chrono::{DateTime, Utc};
use common::{
    enums::{DeliveryStatus, OrderStatus},
    error::{AppError, Res},
};
use serde::Serialize;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, sqlx::FromRow, Serialize)]
pub struct OrderTotals {
    pub count: i64,
    pub total: i64,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrderStatusCount {
    pub status: OrderStatus,
    pub count: i64,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DeliveryStatusCount {
    pub status: DeliveryStatus,
    pub count: i64,
}

pub async fn orders_by_status<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    company_id: Uuid,
) -> Res<Vec<OrderStatusCount>> {
    sqlx::query_as::<_, OrderStatusCount>(
        "SELECT status, COUNT(*) AS count FROM orders WHERE company_id = $1 GROUP BY status",
    )
    .bind(company_id)
    .fetch_all(executor)
    .await
    .map_err(AppError::from)
}

/// Non-cancelled orders created in `[from, to)`.
pub async fn order_totals<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    company_id: Uuid,
    vendor_id: Option<Uuid>,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Res<OrderTotals> {
    sqlx::query_as::<_, OrderTotals>(
        r#"
        SELECT COUNT(*) AS count, COALESCE(SUM(amount), 0)::BIGINT AS total
        FROM orders
        WHERE company_id = $1
          AND ($2::uuid IS NULL OR vendor_id = $2)
          AND status <> 'CANCELLED'
          AND created_at >= $3 AND created_at < $4
        "#,
    )
    .bind(company_id)
    .bind(vendor_id)
    .bind(from)
    .bind(to)
    .fetch_one(executor)
    .await
    .map_err(AppError::from)
}

pub async fn count_visits<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    company_id: Uuid,
    vendor_id: Option<Uuid>,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Res<i64> {
    sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM visits
        WHERE company_id = $1
          AND ($2::uuid IS NULL OR vendor_id = $2)
          AND check_in_at >= $3 AND check_in_at < $4
        "#,
    )
    .bind(company_id)
    .bind(vendor_id)
    .bind(from)
    .bind(to)
    .fetch_one(executor)
    .await
    .map_err(AppError::from)
}

/// Deliveries per status: PENDING ones regardless of date, terminal ones
/// completed since `since`.
pub async fn deliveries_by_status<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    company_id: Uuid,
    delivery_person_id: Option<Uuid>,
    since: DateTime<Utc>,
) -> Res<Vec<DeliveryStatusCount>> {
    sqlx::query_as::<_, DeliveryStatusCount>(
        r#"
        SELECT status, COUNT(*) AS count FROM deliveries
        WHERE company_id = $1
          AND ($2::uuid IS NULL OR delivery_person_id = $2)
          AND (status = 'PENDING' OR completed_at >= $3)
        GROUP BY status
        "#,
    )
    .bind(company_id)
    .bind(delivery_person_id)
    .bind(since)
    .fetch_all(executor)
    .await
    .map_err(AppError::from)
}
