use common::error::{AppError, Res};
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    dtos::subscription::{PlanCreateRequest, PlanUpdateRequest},
    models::subscription::Plan,
};

fn not_found() -> AppError {
    AppError::NotFound("Plan no encontrado".to_string())
}

pub async fn list_plans<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    only_active: bool,
) -> Res<Vec<Plan>> {
    sqlx::query_as::<_, Plan>(
        "SELECT * FROM plans WHERE (NOT $1 OR active) ORDER BY price_monthly",
    )
    .bind(only_active)
    .fetch_all(executor)
    .await
    .map_err(AppError::from)
}

pub async fn get_plan<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    plan_id: Uuid,
) -> Res<Plan> {
    sqlx::query_as::<_, Plan>("SELECT * FROM plans WHERE id = $1")
        .bind(plan_id)
        .fetch_optional(executor)
        .await?
        .ok_or_else(not_found)
}

/// Plan given to new tenants for their trial.
pub async fn get_cheapest_active_plan<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
) -> Res<Plan> {
    sqlx::query_as::<_, Plan>(
        "SELECT * FROM plans WHERE active ORDER BY price_monthly ASC, created_at ASC LIMIT 1",
    )
    .fetch_optional(executor)
    .await?
    .ok_or_else(|| AppError::Internal("No hay planes activos configurados".to_string()))
}

pub async fn insert_plan<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    data: PlanCreateRequest,
) -> Res<Plan> {
    sqlx::query_as::<_, Plan>(
        r#"
        INSERT INTO plans (
            name, description, price_monthly, max_vendors, max_customers,
            max_delivery_people, dian_enabled, reports_enabled, api_access
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING *
        "#,
    )
    .bind(data.name)
    .bind(data.description)
    .bind(data.price_monthly)
    .bind(data.max_vendors)
    .bind(data.max_customers)
    .bind(data.max_delivery_people)
    .bind(data.dian_enabled)
    .bind(data.reports_enabled)
    .bind(data.api_access)
    .fetch_one(executor)
    .await
    .map_err(AppError::from)
}

pub async fn update_plan<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    plan_id: Uuid,
    data: PlanUpdateRequest,
) -> Res<Plan> {
    sqlx::query_as::<_, Plan>(
        r#"
        UPDATE plans SET
            name = COALESCE($2, name),
            description = COALESCE($3, description),
            price_monthly = COALESCE($4, price_monthly),
            max_vendors = COALESCE($5, max_vendors),
            max_customers = COALESCE($6, max_customers),
            max_delivery_people = COALESCE($7, max_delivery_people),
            dian_enabled = COALESCE($8, dian_enabled),
            reports_enabled = COALESCE($9, reports_enabled),
            api_access = COALESCE($10, api_access),
            active = COALESCE($11, active),
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(plan_id)
    .bind(data.name)
    .bind(data.description)
    .bind(data.price_monthly)
    .bind(data.max_vendors)
    .bind(data.max_customers)
    .bind(data.max_delivery_people)
    .bind(data.dian_enabled)
    .bind(data.reports_enabled)
    .bind(data.api_access)
    .bind(data.active)
    .fetch_optional(executor)
    .await?
    .ok_or_else(not_found)
}

/// Plan of the tenant's current subscription, if any.
pub async fn get_company_plan<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    company_id: Uuid,
) -> Res<Option<Plan>> {
    sqlx::query_as::<_, Plan>(
        r#"
        SELECT p.* FROM plans p
        JOIN subscriptions s ON s.plan_id = p.id
        WHERE s.company_id = $1
        "#,
    )
    .bind(company_id)
    .fetch_optional(executor)
    .await
    .map_err(AppError::from)
}
