use chrono::{DateTime, Utc};
use common::error::{AppError, Res};
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    dtos::visit::{ScheduledVisitCreateRequest, ScheduledVisitFilter, ScheduledVisitUpdateRequest},
    models::visit::ScheduledVisit,
};

fn not_found() -> AppError {
    AppError::NotFound("Visita programada no encontrada".to_string())
}

pub async fn insert_scheduled_visit<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    data: ScheduledVisitCreateRequest,
) -> Res<ScheduledVisit> {
    sqlx::query_as::<_, ScheduledVisit>(
        r#"
        INSERT INTO scheduled_visits (company_id, customer_id, vendor_id, scheduled_for, notes)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(data.company_id)
    .bind(data.customer_id)
    .bind(data.vendor_id)
    .bind(data.scheduled_for)
    .bind(data.notes)
    .fetch_one(executor)
    .await
    .map_err(AppError::from)
}

pub async fn get_scheduled_visit<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    company_id: Uuid,
    id: Uuid,
) -> Res<ScheduledVisit> {
    sqlx::query_as::<_, ScheduledVisit>(
        "SELECT * FROM scheduled_visits WHERE id = $1 AND company_id = $2",
    )
    .bind(id)
    .bind(company_id)
    .fetch_optional(executor)
    .await?
    .ok_or_else(not_found)
}

pub async fn list_scheduled_visits<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    filter: ScheduledVisitFilter,
) -> Res<Vec<ScheduledVisit>> {
    sqlx::query_as::<_, ScheduledVisit>(
        r#"
        SELECT * FROM scheduled_visits
        WHERE company_id = $1
          AND ($2::uuid IS NULL OR vendor_id = $2)
          AND (NOT $3 OR completed_at IS NULL)
        ORDER BY scheduled_for
        "#,
    )
    .bind(filter.company_id)
    .bind(filter.vendor_id)
    .bind(filter.pending_only)
    .fetch_all(executor)
    .await
    .map_err(AppError::from)
}

pub async fn update_scheduled_visit<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    company_id: Uuid,
    id: Uuid,
    data: ScheduledVisitUpdateRequest,
) -> Res<ScheduledVisit> {
    sqlx::query_as::<_, ScheduledVisit>(
        r#"
        UPDATE scheduled_visits SET
            vendor_id = COALESCE($3, vendor_id),
            scheduled_for = COALESCE($4, scheduled_for),
            notes = COALESCE($5, notes)
        WHERE id = $1 AND company_id = $2
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(company_id)
    .bind(data.vendor_id)
    .bind(data.scheduled_for)
    .bind(data.notes)
    .fetch_optional(executor)
    .await?
    .ok_or_else(not_found)
}

pub async fn delete_scheduled_visit<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    company_id: Uuid,
    id: Uuid,
) -> Res<()> {
    let result = sqlx::query("DELETE FROM scheduled_visits WHERE id = $1 AND company_id = $2")
        .bind(id)
        .bind(company_id)
        .execute(executor)
        .await?;

    if result.rows_affected() == 0 {
        return Err(not_found());
    }
    Ok(())
}

/// Marks every pending schedule of this vendor and customer planned up to
/// `until` as done. Returns how many were closed.
pub async fn complete_due<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    vendor_id: Uuid,
    customer_id: Uuid,
    until: DateTime<Utc>,
    completed_at: DateTime<Utc>,
) -> Res<u64> {
    let result = sqlx::query(
        r#"
        UPDATE scheduled_visits SET completed_at = $4
        WHERE vendor_id = $1
          AND customer_id = $2
          AND completed_at IS NULL
          AND scheduled_for <= $3
        "#,
    )
    .bind(vendor_id)
    .bind(customer_id)
    .bind(until)
    .bind(completed_at)
    .execute(executor)
    .await?;
    Ok(result.rows_affected())
}
