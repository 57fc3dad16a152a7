use common::error::{AppError, Res};
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    dtos::subscription::{SubscriptionCreateRequest, SubscriptionUpdateRequest},
    models::subscription::Subscription,
};

pub async fn insert_subscription<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    data: SubscriptionCreateRequest,
) -> Res<Subscription> {
    sqlx::query_as::<_, Subscription>(
        r#"
        INSERT INTO subscriptions (company_id, plan_id, status, trial_ends_at, current_period_end)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(data.company_id)
    .bind(data.plan_id)
    .bind(data.status)
    .bind(data.trial_ends_at)
    .bind(data.current_period_end)
    .fetch_one(executor)
    .await
    .map_err(AppError::from)
}

pub async fn get_by_company<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    company_id: Uuid,
) -> Res<Option<Subscription>> {
    sqlx::query_as::<_, Subscription>("SELECT * FROM subscriptions WHERE company_id = $1")
        .bind(company_id)
        .fetch_optional(executor)
        .await
        .map_err(AppError::from)
}

pub async fn update_by_company<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    company_id: Uuid,
    data: SubscriptionUpdateRequest,
) -> Res<Option<Subscription>> {
    sqlx::query_as::<_, Subscription>(
        r#"
        UPDATE subscriptions SET
            plan_id = COALESCE($2, plan_id),
            status = COALESCE($3, status),
            trial_ends_at = COALESCE($4, trial_ends_at),
            current_period_end = COALESCE($5, current_period_end),
            updated_at = NOW()
        WHERE company_id = $1
        RETURNING *
        "#,
    )
    .bind(company_id)
    .bind(data.plan_id)
    .bind(data.status)
    .bind(data.trial_ends_at)
    .bind(data.current_period_end)
    .fetch_optional(executor)
    .await
    .map_err(AppError::from)
}
